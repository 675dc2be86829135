use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status literals as stored in `imovel.status_disponibilidade`.
pub const STATUS_AVAILABLE: &str = "Disponível";
pub const STATUS_SOLD: &str = "Vendido";
pub const STATUS_RENTED: &str = "Alugado";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct TopSeller {
    pub employee: String,
    pub role: String,
    pub deals: i64,
    pub total_value: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct AreaPrice {
    pub neighborhood: String,
    pub property_type: String,
    pub avg_price_per_m2: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct StaleListing {
    pub id: i64,
    pub property_type: String,
    pub address: String,
    pub days_listed: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct MonthlyRevenue {
    pub month: i64,
    pub commission: Decimal,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct OwnerPortfolio {
    pub owner: String,
    pub email: String,
    pub properties: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct ColdLead {
    pub client: String,
    pub email: String,
    pub phone: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct TopTransaction {
    pub property_type: String,
    pub address: String,
    pub value: Decimal,
    pub broker: String,
    pub buyer: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct Occupancy {
    pub property_type: String,
    pub total: i64,
    pub negotiated: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct CleaningCost {
    pub neighborhood: String,
    pub total_cost: Decimal,
}

/// Row of the employee listing (employee joined to its role).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub salary: Decimal,
}

/// Validated employee ready for insertion. `password_hash` is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub cpf: String,
    pub address: String,
    pub phone: String,
    pub admission_date: NaiveDate,
    pub salary: Decimal,
    pub login: String,
    pub password_hash: String,
    pub role_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryUpdate {
    pub id: i64,
    pub salary: Decimal,
}
