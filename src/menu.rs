use crate::{
    console::Console,
    db::Store,
    employees::{self, EmployeeAction},
    errors::AppError,
    reports::{self, Report},
};

/// A closed set of numbered options shown at one menu level.
pub trait MenuOption: Copy + Sized + 'static {
    fn all() -> &'static [Self];
    fn key(self) -> &'static str;
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    Pick(T),
    Back,
}

/// Exact match on the trimmed input; `0` leaves the level.
pub fn parse_selection<T: MenuOption>(input: &str) -> Option<Selection<T>> {
    if input == "0" {
        return Some(Selection::Back);
    }
    T::all()
        .iter()
        .copied()
        .find(|option| option.key() == input)
        .map(Selection::Pick)
}

fn render_menu<T: MenuOption>(banner: &str, back_label: &str) -> Vec<String> {
    let mut out = vec![format!("\n{}", banner)];
    for option in T::all() {
        out.push(format!("{:>2}. {}", option.key(), option.label()));
    }
    out.push(format!("{:>2}. {}", "0", back_label));
    out
}

/// Prints the menu, reads one answer and re-prompts until it is valid.
fn prompt<T, C>(console: &mut C, banner: &str, back_label: &str, question: &str) -> Result<Selection<T>, AppError>
where
    T: MenuOption,
    C: Console + ?Sized,
{
    loop {
        for line in render_menu::<T>(banner, back_label) {
            console.print(&line);
        }
        let answer = console.read_line(question)?;
        match parse_selection::<T>(&answer) {
            Some(selection) => return Ok(selection),
            None => console.print("Invalid option."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    Reports,
    Employees,
}

impl MenuOption for MainChoice {
    fn all() -> &'static [Self] {
        &[MainChoice::Reports, MainChoice::Employees]
    }

    fn key(self) -> &'static str {
        match self {
            MainChoice::Reports => "1",
            MainChoice::Employees => "2",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MainChoice::Reports => "Management Reports",
            MainChoice::Employees => "Manage Employees",
        }
    }
}

impl MenuOption for Report {
    fn all() -> &'static [Self] {
        &Report::ALL
    }

    fn key(self) -> &'static str {
        Report::key(self)
    }

    fn label(self) -> &'static str {
        Report::label(self)
    }
}

impl MenuOption for EmployeeAction {
    fn all() -> &'static [Self] {
        &EmployeeAction::ALL
    }

    fn key(self) -> &'static str {
        EmployeeAction::key(self)
    }

    fn label(self) -> &'static str {
        EmployeeAction::label(self)
    }
}

/// Main loop. Returns when the operator picks exit or input fails; the caller
/// closes the session either way.
pub async fn run<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    loop {
        let banner = format!("{} REAL ESTATE MAIN MENU {}", "#".repeat(15), "#".repeat(15));
        match prompt::<MainChoice, C>(console, &banner, "Exit", "Choose an option: ")? {
            Selection::Pick(MainChoice::Reports) => reports_menu(store, console).await?,
            Selection::Pick(MainChoice::Employees) => employees_menu(store, console).await?,
            Selection::Back => return Ok(()),
        }
    }
}

async fn reports_menu<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    let banner = format!("{} REPORTS MENU {}", "=".repeat(20), "=".repeat(20));
    loop {
        match prompt::<Report, C>(console, &banner, "Back to Main Menu", "Choose a report: ")? {
            Selection::Pick(report) => reports::run(report, store, console).await?,
            Selection::Back => return Ok(()),
        }
    }
}

async fn employees_menu<S, C>(store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    let banner = format!("{} MANAGE EMPLOYEES {}", "=".repeat(15), "=".repeat(15));
    loop {
        match prompt::<EmployeeAction, C>(console, &banner, "Back to Main Menu", "Choose an option: ")? {
            Selection::Pick(action) => employees::run(action, store, console).await?,
            Selection::Back => return Ok(()),
        }
    }
}
