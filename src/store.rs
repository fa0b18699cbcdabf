//! In-memory record store.
//!
//! All tables sit behind one [`RwLock`]. Reads take a shared lock; every
//! write runs inside [`Database::transaction`]. A [`Transaction`] records
//! the prior value of each row it touches and puts those values back unless
//! the closure returns `Ok`, so a failed bulk import leaves nothing behind.

use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeViolation5S, Exam, ExamAnswer, IssueReturnLog, MonthlyPayroll,
    SalaryProfile, Timesheet, Tool, ToolSupplyLog, UserAccount, Violation5S,
};

/// Key of an employee's 5S violation count.
pub type ViolationKey = (String, String, NaiveDate);

/// Key of a monthly payroll: employee code, year and month.
pub type PayrollKey = (String, i32, u32);

/// Every table in the store.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    /// Employees by code.
    pub employees: HashMap<String, Employee>,
    /// Salary profiles by employee code.
    pub salaries: HashMap<String, SalaryProfile>,
    /// Monthly payrolls by id.
    pub payrolls: BTreeMap<u64, MonthlyPayroll>,
    /// Timesheets by id.
    pub timesheets: BTreeMap<u64, Timesheet>,
    /// Exams by id.
    pub exams: BTreeMap<u64, Exam>,
    /// Submitted exam answers.
    pub answers: Vec<ExamAnswer>,
    /// Tools by code.
    pub tools: BTreeMap<String, Tool>,
    /// Import and scrap log.
    pub supply_logs: Vec<ToolSupplyLog>,
    /// Issue and return log.
    pub issue_logs: Vec<IssueReturnLog>,
    /// The 5S violation catalog by code.
    pub violation_types: BTreeMap<String, Violation5S>,
    /// Per-employee violation counts.
    pub violations: BTreeMap<ViolationKey, EmployeeViolation5S>,
    /// Login accounts by lowercased username.
    pub accounts: HashMap<String, UserAccount>,
    payroll_keys: HashMap<PayrollKey, u64>,
    last_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Whether any answer has been submitted for an exam.
    pub fn exam_has_answers(&self, exam_id: u64) -> bool {
        self.answers.iter().any(|a| a.exam_id == exam_id)
    }

    /// The id of the payroll stored for an employee and month.
    pub fn payroll_id(&self, key: &PayrollKey) -> Option<u64> {
        self.payroll_keys.get(key).copied()
    }

    /// Keys of every stored payroll.
    pub fn payroll_keys(&self) -> impl Iterator<Item = &PayrollKey> {
        self.payroll_keys.keys()
    }
}

fn not_found(entity: &'static str, id: impl ToString) -> EngineError {
    EngineError::RecordNotFound {
        entity,
        id: id.to_string(),
    }
}

/// Prior state of one row, put back on rollback.
#[derive(Debug)]
enum Undo {
    Employee(String, Option<Employee>),
    Payroll(u64, Option<MonthlyPayroll>),
    Timesheet(u64, Option<Timesheet>),
    Exam(u64, Option<Exam>),
    Answer(usize, ExamAnswer),
    Tool(String, Option<Tool>),
    Violation(ViolationKey, Option<EmployeeViolation5S>),
}

/// A write in progress.
///
/// Reads go through `Deref` to [`Tables`]. Every mutation goes through a
/// method here so that the prior value is logged first. Dropping an
/// uncommitted transaction, including while unwinding from a panic, rolls
/// every logged change back.
#[derive(Debug)]
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    undo: Vec<Undo>,
    last_id: u64,
    answers_len: usize,
    supply_logs_len: usize,
    issue_logs_len: usize,
    committed: bool,
}

impl<'a> Transaction<'a> {
    fn begin(tables: &'a mut Tables) -> Self {
        Self {
            last_id: tables.last_id,
            answers_len: tables.answers.len(),
            supply_logs_len: tables.supply_logs.len(),
            issue_logs_len: tables.issue_logs.len(),
            tables,
            undo: Vec::new(),
            committed: false,
        }
    }

    /// Allocates a surrogate id. Ids are unique across every table.
    pub fn next_id(&mut self) -> u64 {
        self.tables.next_id()
    }

    /// Adds or replaces an employee.
    pub fn insert_employee(&mut self, employee: Employee) {
        let code = employee.code.clone();
        let prior = self.tables.employees.insert(code.clone(), employee);
        self.undo.push(Undo::Employee(code, prior));
    }

    /// Stores a new payroll under its id.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRecord` when the employee already has a payroll for
    /// that month.
    pub fn insert_payroll(&mut self, payroll: MonthlyPayroll) -> EngineResult<()> {
        let key = payroll.key();
        if self.tables.payroll_keys.contains_key(&key) {
            return Err(EngineError::DuplicateRecord {
                entity: "payroll",
                key: format!("{}/{}-{:02}", key.0, key.1, key.2),
            });
        }
        let id = payroll.id;
        let prior = self.tables.payrolls.insert(id, payroll);
        self.tables.payroll_keys.insert(key, id);
        self.undo.push(Undo::Payroll(id, prior));
        Ok(())
    }

    /// Looks up a payroll for writing.
    pub fn payroll_mut(&mut self, id: u64) -> EngineResult<&mut MonthlyPayroll> {
        let payroll = self
            .tables
            .payrolls
            .get_mut(&id)
            .ok_or_else(|| not_found("payroll", id))?;
        self.undo.push(Undo::Payroll(id, Some(payroll.clone())));
        Ok(payroll)
    }

    /// Looks up a timesheet for writing.
    pub fn timesheet_mut(&mut self, id: u64) -> EngineResult<&mut Timesheet> {
        let timesheet = self
            .tables
            .timesheets
            .get_mut(&id)
            .ok_or_else(|| not_found("timesheet", id))?;
        self.undo.push(Undo::Timesheet(id, Some(timesheet.clone())));
        Ok(timesheet)
    }

    /// Looks up an exam for writing.
    pub fn exam_mut(&mut self, id: u64) -> EngineResult<&mut Exam> {
        let exam = self
            .tables
            .exams
            .get_mut(&id)
            .ok_or_else(|| not_found("exam", id))?;
        self.undo.push(Undo::Exam(id, Some(exam.clone())));
        Ok(exam)
    }

    /// Appends a graded exam answer.
    pub fn push_answer(&mut self, answer: ExamAnswer) {
        self.tables.answers.push(answer);
    }

    /// Looks up a stored exam answer for writing.
    pub fn answer_mut(&mut self, id: u64) -> EngineResult<&mut ExamAnswer> {
        let index = self
            .tables
            .answers
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| not_found("exam answer", id))?;
        let answer = &mut self.tables.answers[index];
        self.undo.push(Undo::Answer(index, answer.clone()));
        Ok(answer)
    }

    /// Looks up a tool for writing.
    pub fn tool_mut(&mut self, code: &str) -> EngineResult<&mut Tool> {
        let tool = self
            .tables
            .tools
            .get_mut(code)
            .ok_or_else(|| not_found("tool", code))?;
        self.undo.push(Undo::Tool(code.to_string(), Some(tool.clone())));
        Ok(tool)
    }

    /// Appends to the import and scrap log.
    pub fn push_supply_log(&mut self, log: ToolSupplyLog) {
        self.tables.supply_logs.push(log);
    }

    /// Appends to the issue and return log.
    pub fn push_issue_log(&mut self, log: IssueReturnLog) {
        self.tables.issue_logs.push(log);
    }

    /// Adds or replaces an employee's violation count.
    pub fn insert_violation(&mut self, violation: EmployeeViolation5S) {
        let key = violation.key();
        let prior = self.tables.violations.insert(key.clone(), violation);
        self.undo.push(Undo::Violation(key, prior));
    }

    /// Looks up an employee's violation count for writing.
    pub fn violation_mut(&mut self, key: &ViolationKey) -> Option<&mut EmployeeViolation5S> {
        let violation = self.tables.violations.get_mut(key)?;
        self.undo.push(Undo::Violation(key.clone(), Some(violation.clone())));
        Some(violation)
    }

    fn rollback(&mut self) {
        let tables = &mut *self.tables;
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Employee(code, Some(prior)) => {
                    tables.employees.insert(code, prior);
                }
                Undo::Employee(code, None) => {
                    tables.employees.remove(&code);
                }
                Undo::Payroll(id, Some(prior)) => {
                    tables.payrolls.insert(id, prior);
                }
                Undo::Payroll(id, None) => {
                    if let Some(removed) = tables.payrolls.remove(&id) {
                        tables.payroll_keys.remove(&removed.key());
                    }
                }
                Undo::Timesheet(id, Some(prior)) => {
                    tables.timesheets.insert(id, prior);
                }
                Undo::Timesheet(id, None) => {
                    tables.timesheets.remove(&id);
                }
                Undo::Exam(id, Some(prior)) => {
                    tables.exams.insert(id, prior);
                }
                Undo::Exam(id, None) => {
                    tables.exams.remove(&id);
                }
                Undo::Answer(index, prior) => {
                    if let Some(slot) = tables.answers.get_mut(index) {
                        *slot = prior;
                    }
                }
                Undo::Tool(code, Some(prior)) => {
                    tables.tools.insert(code, prior);
                }
                Undo::Tool(code, None) => {
                    tables.tools.remove(&code);
                }
                Undo::Violation(key, Some(prior)) => {
                    tables.violations.insert(key, prior);
                }
                Undo::Violation(key, None) => {
                    tables.violations.remove(&key);
                }
            }
        }
        tables.answers.truncate(self.answers_len);
        tables.supply_logs.truncate(self.supply_logs_len);
        tables.issue_logs.truncate(self.issue_logs_len);
        tables.last_id = self.last_id;
    }
}

impl Deref for Transaction<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &*self.tables
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

/// Rejects a write made against a stale copy of a record.
pub fn check_version(
    entity: &'static str,
    id: impl ToString,
    expected: u64,
    actual: u64,
) -> EngineResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::ConcurrencyConflict {
            entity,
            id: id.to_string(),
        })
    }
}

/// Reference data loaded at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    /// Employees.
    pub employees: Vec<Employee>,
    /// Salary profiles.
    pub salary_profiles: Vec<SalaryProfile>,
    /// Tools.
    pub tools: Vec<Tool>,
    /// The 5S violation catalog.
    pub violation_types: Vec<Violation5S>,
    /// Timesheets; a nonzero id is kept.
    pub timesheets: Vec<Timesheet>,
    /// Exams; ids are reassigned.
    pub exams: Vec<Exam>,
    /// Login accounts with argon2 hashes.
    pub accounts: Vec<UserAccount>,
}

impl Seed {
    /// Reads a seed file.
    pub fn load(path: &std::path::Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// The shared store.
#[derive(Debug, Default)]
pub struct Database {
    tables: RwLock<Tables>,
}

impl Database {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a read-only query.
    pub fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        query(&tables)
    }

    /// Runs `work` as one all-or-nothing write.
    ///
    /// Writers are serialized. If `work` returns an error or panics, every
    /// change it made is rolled back before the lock is released.
    pub fn transaction<T>(
        &self,
        work: impl FnOnce(&mut Transaction<'_>) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut tx = Transaction::begin(&mut tables);
        let result = work(&mut tx)?;
        tx.committed = true;
        Ok(result)
    }

    /// Creates a store holding the seed's records.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a tool whose totals are out of range and
    /// `DuplicateRecord` for two timesheets with the same id.
    pub fn from_seed(seed: Seed) -> EngineResult<Self> {
        let db = Self::new();
        for employee in seed.employees {
            db.put_employee(employee);
        }
        for profile in seed.salary_profiles {
            db.put_salary_profile(profile);
        }
        for tool in seed.tools {
            db.put_tool(tool)?;
        }
        for violation in seed.violation_types {
            db.put_violation_type(violation);
        }
        for timesheet in seed.timesheets {
            db.put_timesheet(timesheet)?;
        }
        for exam in seed.exams {
            db.insert_exam(exam);
        }
        for account in seed.accounts {
            db.put_account(account);
        }
        Ok(db)
    }

    /// Adds or replaces an employee.
    pub fn put_employee(&self, employee: Employee) {
        self.write(|t| {
            t.employees.insert(employee.code.clone(), employee);
        });
    }

    /// Adds or replaces a salary profile.
    pub fn put_salary_profile(&self, profile: SalaryProfile) {
        self.write(|t| {
            t.salaries.insert(profile.employee_code.clone(), profile);
        });
    }

    /// Adds or replaces a tool, recomputing its available quantity.
    pub fn put_tool(&self, mut tool: Tool) -> EngineResult<()> {
        crate::calculation::recompute_available(&mut tool)?;
        self.write(|t| {
            t.tools.insert(tool.code.clone(), tool);
        });
        Ok(())
    }

    /// Adds or replaces a 5S violation type.
    pub fn put_violation_type(&self, violation: Violation5S) {
        self.write(|t| {
            t.violation_types.insert(violation.code.clone(), violation);
        });
    }

    /// Adds or replaces a login account.
    pub fn put_account(&self, account: UserAccount) {
        self.write(|t| {
            t.accounts.insert(account.username.to_lowercase(), account);
        });
    }

    /// Stores a new exam under a fresh id and returns the id.
    pub fn insert_exam(&self, mut exam: Exam) -> u64 {
        self.write(|t| {
            let id = t.next_id();
            exam.id = id;
            t.exams.insert(id, exam);
            id
        })
    }

    /// Stores a new timesheet under a fresh id at version 1 and returns the id.
    pub fn insert_timesheet(&self, mut timesheet: Timesheet) -> u64 {
        self.write(|t| {
            let id = t.next_id();
            timesheet.id = id;
            timesheet.version = 1;
            t.timesheets.insert(id, timesheet);
            id
        })
    }

    /// Stores an existing timesheet, keeping its id when it has one.
    ///
    /// Ids allocated later start above it. The version is at least 1.
    pub fn put_timesheet(&self, mut timesheet: Timesheet) -> EngineResult<u64> {
        self.write(|t| {
            if timesheet.id == 0 {
                timesheet.id = t.next_id();
            } else if t.timesheets.contains_key(&timesheet.id) {
                return Err(EngineError::DuplicateRecord {
                    entity: "timesheet",
                    key: timesheet.id.to_string(),
                });
            }
            t.last_id = t.last_id.max(timesheet.id);
            timesheet.version = timesheet.version.max(1);
            let id = timesheet.id;
            t.timesheets.insert(id, timesheet);
            Ok(id)
        })
    }

    fn write<T>(&self, work: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        work(&mut tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(code: &str) -> Employee {
        Employee {
            code: code.to_string(),
            name: "Test".to_string(),
            department: "Press".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::new();
        db.put_employee(employee("NV0001"));

        let result: EngineResult<()> = db.transaction(|t| {
            t.insert_employee(employee("NV0002"));
            Err(EngineError::CalculationError {
                message: "boom".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(db.read(|t| t.employees.len()), 1);
    }

    #[test]
    fn test_successful_transaction_commits() {
        let db = Database::new();
        db.transaction(|t| {
            t.insert_employee(employee("NV0002"));
            Ok(())
        })
        .unwrap();
        assert!(db.read(|t| t.employees.contains_key("NV0002")));
    }

    #[test]
    fn test_ids_are_unique_across_tables() {
        let db = Database::new();
        let exam = Exam {
            id: 0,
            title: "Safety".to_string(),
            kind: crate::models::ExamKind::Standard,
            has_essay: false,
            questions: Vec::new(),
        };
        let a = db.insert_exam(exam.clone());
        let b = db.insert_exam(exam);
        assert_ne!(a, b);
    }

    #[test]
    fn test_check_version_conflict() {
        assert!(check_version("payroll", 1, 3, 3).is_ok());
        assert!(matches!(
            check_version("payroll", 1, 2, 3),
            Err(EngineError::ConcurrencyConflict { entity: "payroll", .. })
        ));
    }

    #[test]
    fn test_seed_file_loads() {
        let seed = Seed::load(std::path::Path::new("./config/default/seed.yaml")).unwrap();
        let db = Database::from_seed(seed).unwrap();
        assert!(db.read(|t| t.employees.contains_key("NV0001")));
        assert_eq!(db.read(|t| t.timesheets[&1001].version), 1);
        assert!(db.read(|t| t.salaries.contains_key("NV0001")));
        assert_eq!(db.read(|t| t.tools["DRL-06"].available_qty), 40);
        assert_eq!(db.read(|t| t.exams.len()), 1);
    }

    #[test]
    fn test_accounts_keyed_case_insensitively() {
        let db = Database::new();
        db.put_account(UserAccount {
            username: "HoaNguyen".to_string(),
            password_hash: String::new(),
            employee_code: "NV0001".to_string(),
            department: "Press".to_string(),
            permissions: Vec::new(),
        });
        assert!(db.read(|t| t.accounts.contains_key("hoanguyen")));
    }

    fn tool(code: &str, qty: i64) -> Tool {
        Tool {
            code: code.to_string(),
            name: code.to_string(),
            initial_qty: qty,
            imported_qty: 0,
            scrapped_qty: 0,
            issued_qty: 0,
            returned_qty: 0,
            available_qty: qty,
        }
    }

    fn payroll(id: u64, employee_code: &str) -> MonthlyPayroll {
        MonthlyPayroll {
            id,
            employee_code: employee_code.to_string(),
            year: 2024,
            month: 3,
            base_salary: None,
            insurance_salary: None,
            responsibility_per_day: None,
            allowances: Default::default(),
            inputs: Default::default(),
            total_salary: rust_decimal::Decimal::ZERO,
            status: crate::workflow::PayrollStatus::Draft,
            version: 1,
        }
    }

    #[test]
    fn test_failed_transaction_restores_edited_rows_and_logs() {
        let db = Database::new();
        db.put_employee(employee("NV0001"));
        db.put_tool(tool("DRL-01", 10)).unwrap();

        let result: EngineResult<()> = db.transaction(|t| {
            t.tool_mut("DRL-01")?.issued_qty = 4;
            t.push_supply_log(ToolSupplyLog {
                tool_code: "DRL-01".to_string(),
                kind: crate::models::SupplyKind::Import,
                qty: 1,
                at: NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
            });
            let mut renamed = employee("NV0001");
            renamed.name = "Renamed".to_string();
            t.insert_employee(renamed);
            t.next_id();
            Err(EngineError::InvalidInput {
                field: "qty".to_string(),
                message: "rejected".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(db.read(|t| t.tools["DRL-01"].issued_qty), 0);
        assert!(db.read(|t| t.supply_logs.is_empty()));
        assert_eq!(db.read(|t| t.employees["NV0001"].name.clone()), "Test");
        assert_eq!(db.read(|t| t.last_id), 0);
    }

    #[test]
    fn test_panicking_transaction_leaves_tables_intact() {
        let db = Database::new();
        db.put_employee(employee("NV0001"));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: EngineResult<()> = db.transaction(|t| {
                t.insert_employee(employee("NV0002"));
                panic!("writer failed");
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(db.read(|t| t.employees.len()), 1);
        db.transaction(|t| {
            t.insert_employee(employee("NV0003"));
            Ok(())
        })
        .unwrap();
        assert_eq!(db.read(|t| t.employees.len()), 2);
    }

    #[test]
    fn test_payroll_key_index_follows_commit_and_rollback() {
        let db = Database::new();
        let key = ("NV0001".to_string(), 2024, 3);

        let _: EngineResult<()> = db.transaction(|t| {
            t.insert_payroll(payroll(7, "NV0001"))?;
            Err(EngineError::CalculationError {
                message: "boom".to_string(),
            })
        });
        assert_eq!(db.read(|t| t.payroll_id(&key)), None);

        db.transaction(|t| t.insert_payroll(payroll(8, "NV0001"))).unwrap();
        assert_eq!(db.read(|t| t.payroll_id(&key)), Some(8));
        assert!(matches!(
            db.transaction(|t| t.insert_payroll(payroll(9, "NV0001"))),
            Err(EngineError::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn test_seed_timesheet_keeps_id_and_later_ids_start_above() {
        let db = Database::new();
        let id = db
            .put_timesheet(Timesheet {
                id: 500,
                employee_code: "NV0001".to_string(),
                work_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                hours: rust_decimal::Decimal::from(8),
                overtime_hours: rust_decimal::Decimal::ZERO,
                status: crate::workflow::TimesheetStatus::Draft,
                version: 0,
            })
            .unwrap();
        assert_eq!(id, 500);
        assert_eq!(db.read(|t| t.timesheets[&500].version), 1);

        let exam = Exam {
            id: 0,
            title: "Safety".to_string(),
            kind: crate::models::ExamKind::Standard,
            has_essay: false,
            questions: Vec::new(),
        };
        assert_eq!(db.insert_exam(exam), 501);
    }

}
