use chrono::Month;
use rust_decimal::Decimal;

use crate::{
    console::Console,
    db::Store,
    errors::AppError,
    structs::{
        AreaPrice, CleaningCost, ColdLead, MonthlyRevenue, Occupancy, OwnerPortfolio, StaleListing,
        TopSeller, TopTransaction,
    },
    utils::{format_money, occupancy_rate, parse_days, parse_year, two_decimals},
};

/// The canned reports, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    TopSellers,
    PricePerArea,
    StaleListings,
    Conversion,
    MonthlyRevenue,
    MultiPropertyOwners,
    ColdLeads,
    TopTransaction,
    Occupancy,
    CleaningCosts,
}

impl Report {
    pub const ALL: [Report; 10] = [
        Report::TopSellers,
        Report::PricePerArea,
        Report::StaleListings,
        Report::Conversion,
        Report::MonthlyRevenue,
        Report::MultiPropertyOwners,
        Report::ColdLeads,
        Report::TopTransaction,
        Report::Occupancy,
        Report::CleaningCosts,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Report::TopSellers => "1",
            Report::PricePerArea => "2",
            Report::StaleListings => "3",
            Report::Conversion => "4",
            Report::MonthlyRevenue => "5",
            Report::MultiPropertyOwners => "6",
            Report::ColdLeads => "7",
            Report::TopTransaction => "8",
            Report::Occupancy => "9",
            Report::CleaningCosts => "10",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Report::TopSellers => "Top 5 Employees by Sales",
            Report::PricePerArea => "Average Price per m² by Neighborhood",
            Report::StaleListings => "Stale Listings",
            Report::Conversion => "Average Visits per Conversion",
            Report::MonthlyRevenue => "Monthly Commission Revenue",
            Report::MultiPropertyOwners => "Owners with Multiple Properties",
            Report::ColdLeads => "Cold Leads (visited, never bought)",
            Report::TopTransaction => "Highest-Value Transaction",
            Report::Occupancy => "Occupancy Rate by Property Type",
            Report::CleaningCosts => "Cleaning Cost by Neighborhood",
        }
    }
}

/// Runs one report end to end. Only terminal failures are returned; every
/// other failure is printed and the caller goes back to its menu.
pub async fn run<S, C>(report: Report, store: &mut S, console: &mut C) -> Result<(), AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    match produce(report, store, console).await {
        Ok(lines) => {
            for line in lines {
                console.print(&line);
            }
            Ok(())
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            if let AppError::Database(_) = e {
                log::error!("Report {:?} failed: {}", report, e);
            }
            console.print(&format!("Error: {}", e));
            Ok(())
        }
    }
}

async fn produce<S, C>(report: Report, store: &mut S, console: &mut C) -> Result<Vec<String>, AppError>
where
    S: Store + ?Sized,
    C: Console + ?Sized,
{
    let lines = match report {
        Report::TopSellers => render_top_sellers(&store.top_sellers().await?),
        Report::PricePerArea => render_price_per_area(&store.price_per_area().await?),
        Report::StaleListings => {
            let raw = console.read_line("List properties available on the market for more than how many days? ")?;
            let days = parse_days(&raw)?;
            render_stale_listings(days, &store.stale_listings(days).await?)
        }
        Report::Conversion => render_conversion(store.conversion_average().await?),
        Report::MonthlyRevenue => {
            let raw = console.read_line("Year for the revenue report (e.g. 2025): ")?;
            let year = parse_year(&raw)?;
            render_monthly_revenue(year, &store.monthly_revenue(year).await?)
        }
        Report::MultiPropertyOwners => render_owners(&store.multi_property_owners().await?),
        Report::ColdLeads => render_cold_leads(&store.cold_leads().await?),
        Report::TopTransaction => render_top_transaction(store.top_transaction().await?.as_ref()),
        Report::Occupancy => render_occupancy(&store.occupancy().await?),
        Report::CleaningCosts => render_cleaning_costs(&store.cleaning_costs().await?),
    };
    Ok(lines)
}

fn title(text: &str) -> String {
    format!("\n--- Report: {} ---", text)
}

fn rule(width: usize) -> String {
    "-".repeat(width)
}

fn money(value: Decimal, width: usize) -> String {
    format!("R$ {:>width$}", format_money(value), width = width)
}

pub fn render_top_sellers(rows: &[TopSeller]) -> Vec<String> {
    let mut out = vec![title("Top 5 Employees by Sales Value")];
    if rows.is_empty() {
        out.push("No data found.".to_string());
        return out;
    }
    out.push(format!(
        "{:<30} | {:<25} | {:<10} | {:<25}",
        "Employee", "Role", "Deals", "Total Negotiated"
    ));
    out.push(rule(95));
    for row in rows {
        out.push(format!(
            "{:<30} | {:<25} | {:<10} | {}",
            row.employee,
            row.role,
            row.deals,
            money(row.total_value, 22)
        ));
    }
    out
}

pub fn render_price_per_area(rows: &[AreaPrice]) -> Vec<String> {
    let mut out = vec![title("Average Price per m² by Neighborhood (Houses and Apartments)")];
    if rows.is_empty() {
        out.push("No data found.".to_string());
        return out;
    }
    out.push(format!("{:<30} | {:<20} | {:<20}", "Neighborhood", "Property Type", "Avg Price per m²"));
    out.push(rule(75));
    for row in rows {
        out.push(format!(
            "{:<30} | {:<20} | {}",
            row.neighborhood,
            row.property_type,
            money(row.avg_price_per_m2, 17)
        ));
    }
    out
}

pub fn render_stale_listings(days: i64, rows: &[StaleListing]) -> Vec<String> {
    let mut out = vec![title(&format!("Properties Available for More than {} Days", days))];
    if rows.is_empty() {
        out.push("No properties match this criterion.".to_string());
        return out;
    }
    out.push(format!("{:<5} | {:<20} | {:<50} | {:<20}", "ID", "Type", "Address", "Days on Market"));
    out.push(rule(100));
    for row in rows {
        out.push(format!(
            "{:<5} | {:<20} | {:<50} | {:<20}",
            row.id, row.property_type, row.address, row.days_listed
        ));
    }
    out
}

pub fn render_conversion(average: Option<Decimal>) -> Vec<String> {
    let mut out = vec![title("Conversion Analysis")];
    match average {
        Some(avg) => out.push(format!(
            "Average number of visits needed to close a deal: {}",
            two_decimals(avg)
        )),
        None => out.push("Not enough data to compute the average number of visits.".to_string()),
    }
    out
}

fn month_name(month: i64) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| format!("Month {}", month))
}

pub fn render_monthly_revenue(year: i32, rows: &[MonthlyRevenue]) -> Vec<String> {
    let mut out = vec![title(&format!("Monthly Commission Revenue for {}", year))];
    if rows.is_empty() {
        out.push(format!("No transactions found for {}.", year));
        return out;
    }
    out.push(format!("{:<20} | {:<30}", "Month", "Revenue (Commission)"));
    out.push(rule(55));
    for row in rows {
        out.push(format!("{:<20} | {}", month_name(row.month), money(row.commission, 27)));
    }
    out
}

pub fn render_owners(rows: &[OwnerPortfolio]) -> Vec<String> {
    let mut out = vec![title("Owners with Multiple Properties")];
    if rows.is_empty() {
        out.push("No owner with more than one property found.".to_string());
        return out;
    }
    out.push(format!("{:<30} | {:<40} | {:<20}", "Owner", "Email", "Properties"));
    out.push(rule(95));
    for row in rows {
        out.push(format!("{:<30} | {:<40} | {:<20}", row.owner, row.email, row.properties));
    }
    out
}

pub fn render_cold_leads(rows: &[ColdLead]) -> Vec<String> {
    let mut out = vec![title("Leads (clients who visited and did not buy)")];
    if rows.is_empty() {
        out.push("No leads found.".to_string());
        return out;
    }
    out.push(format!("{:<30} | {:<40} | {:<20}", "Client", "Email", "Phone"));
    out.push(rule(95));
    for row in rows {
        out.push(format!("{:<30} | {:<40} | {:<20}", row.client, row.email, row.phone));
    }
    out
}

pub fn render_top_transaction(row: Option<&TopTransaction>) -> Vec<String> {
    let mut out = vec![title("Highest-Value Transaction")];
    match row {
        None => out.push("No transactions found.".to_string()),
        Some(t) => {
            out.push(format!("Property type: {}", t.property_type));
            out.push(format!("Address: {}", t.address));
            out.push(format!("Deal value: R$ {}", format_money(t.value)));
            out.push(format!("Broker: {}", t.broker));
            out.push(format!("Buyer: {}", t.buyer));
        }
    }
    out
}

pub fn render_occupancy(rows: &[Occupancy]) -> Vec<String> {
    let mut out = vec![title("Occupancy Rate by Property Type")];
    if rows.is_empty() {
        out.push("No properties found.".to_string());
        return out;
    }
    out.push(format!(
        "{:<20} | {:<20} | {:<20} | {:<25}",
        "Property Type", "Total Registered", "Total Negotiated", "Occupancy Rate (%)"
    ));
    out.push(rule(95));
    for row in rows {
        out.push(format!(
            "{:<20} | {:<20} | {:<20} | {:>22.2}%",
            row.property_type,
            row.total,
            row.negotiated,
            occupancy_rate(row.total, row.negotiated)
        ));
    }
    out
}

pub fn render_cleaning_costs(rows: &[CleaningCost]) -> Vec<String> {
    let mut out = vec![title("Total Cleaning Cost by Neighborhood")];
    if rows.is_empty() {
        out.push("No cleaning costs recorded.".to_string());
        return out;
    }
    out.push(format!("{:<30} | {:<25}", "Neighborhood", "Total Cleaning Cost"));
    out.push(rule(60));
    for row in rows {
        out.push(format!("{:<30} | {}", row.neighborhood, money(row.total_cost, 22)));
    }
    out
}
