//! Authentication: password login behind a lockout guard, and the
//! [`Principal`] every other operation is checked against.

mod guard;
mod password;
mod principal;

pub use guard::{Clock, LoginGuard, SystemClock};
pub use password::{hash_password, verify_password};
pub use principal::{
    EXAM_EDIT, IMPORT, PAYROLL_APPROVE, PAYROLL_EDIT, Principal, TIMESHEET_APPROVE, TOOL_EDIT,
    VIEW_ALL,
};

use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::store::Database;

/// Verifies a username and password.
///
/// A locked username is refused before the password is looked at. Unknown
/// usernames count as failures so they lock the same way.
///
/// # Errors
///
/// Returns `AccountLocked` while the username is locked and
/// `InvalidCredentials` when the username or password is wrong.
pub fn authenticate(
    db: &Database,
    guard: &LoginGuard,
    username: &str,
    password: &str,
) -> EngineResult<Principal> {
    guard.check(username)?;

    let account = db.read(|t| t.accounts.get(&username.to_lowercase()).cloned());
    let verified = match &account {
        Some(account) => verify_password(password, &account.password_hash)?,
        None => false,
    };

    match account {
        Some(account) if verified => {
            guard.record_success(username);
            info!(username = %username, employee_code = %account.employee_code, "Login succeeded");
            Ok(Principal::from(&account))
        }
        _ => {
            let locked = guard.record_failure(username);
            warn!(username = %username, locked, "Login failed");
            Err(EngineError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::models::UserAccount;

    fn setup() -> (Database, LoginGuard) {
        let db = Database::new();
        db.put_account(UserAccount {
            username: "hoa".to_string(),
            password_hash: hash_password("correct horse").unwrap(),
            employee_code: "NV0001".to_string(),
            department: "Press".to_string(),
            permissions: vec!["Payroll.Edit".to_string()],
        });
        (db, LoginGuard::new(&SecurityConfig::default()))
    }

    #[test]
    fn test_login_returns_principal() {
        let (db, guard) = setup();
        let principal = authenticate(&db, &guard, "HOA", "correct horse").unwrap();
        assert_eq!(principal.employee_code, "NV0001");
        assert!(principal.has_permission("Payroll.Edit"));
    }

    #[test]
    fn test_locked_user_refused_even_with_correct_password() {
        let (db, guard) = setup();
        for _ in 0..5 {
            assert!(matches!(
                authenticate(&db, &guard, "hoa", "wrong"),
                Err(EngineError::InvalidCredentials)
            ));
        }
        assert!(matches!(
            authenticate(&db, &guard, "hoa", "correct horse"),
            Err(EngineError::AccountLocked { .. })
        ));
    }

    #[test]
    fn test_unknown_user_counts_failures() {
        let (db, guard) = setup();
        assert!(authenticate(&db, &guard, "ghost", "x").is_err());
        assert_eq!(guard.failure_count("ghost"), 1);
    }
}
