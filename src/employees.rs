use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    console::Console,
    db::Store,
    errors::{AppError, ValidationError},
    structs::{Employee, NewEmployee, SalaryUpdate},
    utils::{format_money, hash_password, parse_date, parse_id, parse_integer, parse_salary, require},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeAction {
    Create,
    List,
    UpdateSalary,
    Delete,
}

impl EmployeeAction {
    pub const ALL: [EmployeeAction; 4] = [
        EmployeeAction::Create,
        EmployeeAction::List,
        EmployeeAction::UpdateSalary,
        EmployeeAction::Delete,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EmployeeAction::Create => "1",
            EmployeeAction::List => "2",
            EmployeeAction::UpdateSalary => "3",
            EmployeeAction::Delete => "4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmployeeAction::Create => "Register New Employee",
            EmployeeAction::List => "List All Employees",
            EmployeeAction::UpdateSalary => "Update Employee Salary",
            EmployeeAction::Delete => "Delete Employee",
        }
    }
}

/// Raw answers collected by the create prompt.
#[derive(Debug, Clone, Default)]
pub struct EmployeeForm {
    pub name: String,
    pub cpf: String,
    pub address: String,
    pub phone: String,
    pub admission_date: String,
    pub salary: String,
    pub login: String,
    pub password: String,
    pub role_id: String,
}

/// A form whose fields all parsed. The password is still in clear text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEmployee {
    pub name: String,
    pub cpf: String,
    pub address: String,
    pub phone: String,
    pub admission_date: NaiveDate,
    pub salary: Decimal,
    pub login: String,
    password: String,
    pub role_id: i64,
}

impl EmployeeForm {
    pub fn validate(&self) -> Result<ValidEmployee, ValidationError> {
        let name = require("Name", &self.name)?;
        let admission_date = parse_date("Admission date", &self.admission_date)?;
        let salary = parse_salary(&self.salary)?;
        let login = require("Login", &self.login)?;
        if self.password.is_empty() {
            return Err(ValidationError::Empty { field: "Password" });
        }
        let role_id = parse_integer("Role ID", &self.role_id)?;

        Ok(ValidEmployee {
            name,
            cpf: self.cpf.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            admission_date,
            salary,
            login,
            password: self.password.clone(),
            role_id,
        })
    }
}

impl ValidEmployee {
    /// Hashes the login password, producing the row to insert.
    pub fn seal(self) -> Result<NewEmployee, AppError> {
        Ok(NewEmployee {
            password_hash: hash_password(&self.password)?,
            name: self.name,
            cpf: self.cpf,
            address: self.address,
            phone: self.phone,
            admission_date: self.admission_date,
            salary: self.salary,
            login: self.login,
            role_id: self.role_id,
        })
    }
}

pub fn validate_salary_update(raw_id: &str, raw_salary: &str) -> Result<SalaryUpdate, ValidationError> {
    Ok(SalaryUpdate {
        id: parse_id(raw_id)?,
        salary: parse_salary(raw_salary)?,
    })
}

/// `s` (sim) or `y`, any case. Everything else cancels.
pub fn is_affirmative(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "s" | "y")
}

/// Extra guidance for engine errors the user can fix in the schema.
fn schema_hint(e: &AppError) -> Option<&'static str> {
    match e {
        AppError::Database(db) if db.to_string().contains("'senha'") => Some(
            "Hint: login passwords are stored as argon2 hashes of about 100 characters; \
             widen funcionario.senha to at least VARCHAR(100).",
        ),
        _ => None,
    }
}

pub fn render_employees(rows: &[Employee]) -> Vec<String> {
    let mut out = vec!["\n--- Employee List ---".to_string()];
    if rows.is_empty() {
        out.push("No employees registered.".to_string());
        return out;
    }
    out.push(format!(
        "{:<5} | {:<30} | {:<25} | {:<20} | {:<15}",
        "ID", "Name", "Role", "Phone", "Salary"
    ));
    out.push("-".repeat(100));
    for row in rows {
        out.push(format!(
            "{:<5} | {:<30} | {:<25} | {:<20} | R$ {:>12}",
            row.id,
            row.name,
            row.role,
            row.phone,
            format_money(row.salary)
        ));
    }
    out
}

/// Runs one employee operation. Like the reports, only terminal failures
/// escape; everything else is printed here.
pub async fn run<S, C>(action: EmployeeAction, store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    let result = match action {
        EmployeeAction::Create => create(store, console).await,
        EmployeeAction::List => list(store, console).await,
        EmployeeAction::UpdateSalary => update_salary(store, console).await,
        EmployeeAction::Delete => delete(store, console).await,
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            if let AppError::Database(_) = e {
                log::error!("{:?} failed: {}", action, e);
            }
            console.print(&format!("Error: {}", e));
            if let Some(hint) = schema_hint(&e) {
                console.print(hint);
            }
            Ok(())
        }
    }
}

async fn create<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    console.print("\n--- New Employee ---");
    let form = EmployeeForm {
        name: console.read_line("Full name: ")?,
        cpf: console.read_line("CPF (xxx.xxx.xxx-xx): ")?,
        address: console.read_line("Address: ")?,
        phone: console.read_line("Mobile phone: ")?,
        admission_date: console.read_line("Admission date (YYYY-MM-DD): ")?,
        salary: console.read_line("Salary: ")?,
        login: console.read_line("Login username: ")?,
        password: console.read_secret("Login password: ")?,
        role_id: console.read_line("Role ID (1=Broker, 2=Manager, ...): ")?,
    };

    let employee = form.validate()?.seal()?;
    let id = store.insert_employee(&employee).await?;
    console.print(&format!("Employee '{}' registered successfully! ID: {}", employee.name, id));
    Ok(())
}

async fn list<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    let rows = store.list_employees().await?;
    for line in render_employees(&rows) {
        console.print(&line);
    }
    Ok(())
}

async fn update_salary<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    list(store, console).await?;
    let raw_id = console.read_line("\nID of the employee to update: ")?;
    let id = parse_id(&raw_id)?;
    let raw_salary = console.read_line(&format!("NEW salary for employee ID {}: ", id))?;
    let update = validate_salary_update(&raw_id, &raw_salary)?;

    if store.update_salary(update).await? == 0 {
        console.print("No employee found with that ID.");
    } else {
        console.print(&format!("Salary of employee ID {} updated successfully!", update.id));
    }
    Ok(())
}

async fn delete<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    list(store, console).await?;
    let id = parse_id(&console.read_line("\nID of the employee to DELETE: ")?)?;
    let answer = console.read_line(&format!(
        "Are you SURE you want to delete employee ID {}? (s/n): ",
        id
    ))?;
    if !is_affirmative(&answer) {
        console.print("Operation cancelled.");
        return Ok(());
    }

    if store.delete_employee(id).await? == 0 {
        console.print("No employee found with that ID.");
    } else {
        console.print(&format!("Employee ID {} deleted successfully.", id));
    }
    Ok(())
}
