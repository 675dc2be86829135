//! In-memory [`Store`] with the same semantics as the SQL in `db.rs`.
//! Counts every call so tests can prove a path never reached the database.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::Store;
use crate::{
    errors::AppError,
    structs::{
        AreaPrice, CleaningCost, ColdLead, Employee, MonthlyRevenue, NewEmployee, Occupancy,
        OwnerPortfolio, SalaryUpdate, StaleListing, TopSeller, TopTransaction, STATUS_AVAILABLE,
        STATUS_RENTED, STATUS_SOLD,
    },
};

#[derive(Debug, Clone)]
pub struct PropertyRec {
    pub id: i64,
    pub kind: String,
    pub address: String,
    pub neighborhood: String,
    pub price: Decimal,
    /// Set for houses and apartments only.
    pub area: Option<Decimal>,
    pub status: String,
    pub listed: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct EmployeeRec {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub salary: Decimal,
    pub role_id: i64,
    pub login: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct ClientRec {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct VisitRec {
    pub client: i64,
    pub property: i64,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct TransactionRec {
    pub id: i64,
    pub property: i64,
    pub client: i64,
    pub employee: i64,
    pub value: Decimal,
    pub commission: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct OwnerRec {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug)]
pub struct MemoryStore {
    pub today: NaiveDate,
    pub roles: HashMap<i64, String>,
    pub properties: Vec<PropertyRec>,
    pub employees: Vec<EmployeeRec>,
    pub clients: Vec<ClientRec>,
    pub visits: Vec<VisitRec>,
    pub transactions: Vec<TransactionRec>,
    pub owners: Vec<OwnerRec>,
    /// (owner id, property id)
    pub owner_links: Vec<(i64, i64)>,
    /// (property id, cost)
    pub cleanings: Vec<(i64, Decimal)>,
    /// Makes every write fail as if the engine rejected it.
    pub fail_writes: bool,
    /// Width of `funcionario.senha`; longer hashes are rejected like a strict-mode MySQL.
    pub senha_width: Option<usize>,
    pub calls: usize,
    pub commits: usize,
    pub rollbacks: usize,
    next_employee_id: i64,
}

impl MemoryStore {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            roles: HashMap::from([(1, "Broker".to_string()), (2, "Manager".to_string())]),
            properties: Vec::new(),
            employees: Vec::new(),
            clients: Vec::new(),
            visits: Vec::new(),
            transactions: Vec::new(),
            owners: Vec::new(),
            owner_links: Vec::new(),
            cleanings: Vec::new(),
            fail_writes: false,
            senha_width: None,
            calls: 0,
            commits: 0,
            rollbacks: 0,
            next_employee_id: 1,
        }
    }

    pub fn add_employee(&mut self, id: i64, name: &str, salary: i64) -> &mut Self {
        self.employees.push(EmployeeRec {
            id,
            name: name.to_string(),
            phone: "(31) 99999-0000".to_string(),
            salary: Decimal::from(salary),
            role_id: 1,
            login: name.to_lowercase(),
            password_hash: String::new(),
        });
        self.next_employee_id = self.next_employee_id.max(id + 1);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_property(
        &mut self,
        id: i64,
        kind: &str,
        neighborhood: &str,
        price: i64,
        area: Option<i64>,
        status: &str,
        listed: NaiveDate,
    ) -> &mut Self {
        self.properties.push(PropertyRec {
            id,
            kind: kind.to_string(),
            address: format!("Rua {}, {}", neighborhood, id),
            neighborhood: neighborhood.to_string(),
            price: Decimal::from(price),
            area: area.map(Decimal::from),
            status: status.to_string(),
            listed,
        });
        self
    }

    pub fn add_client(&mut self, id: i64, name: &str) -> &mut Self {
        self.clients.push(ClientRec {
            id,
            name: name.to_string(),
            email: format!("{}@mail.com", name.to_lowercase()),
            phone: format!("(31) 90000-000{}", id),
        });
        self
    }

    pub fn add_visit(&mut self, client: i64, property: i64, at: NaiveDateTime) -> &mut Self {
        self.visits.push(VisitRec { client, property, at });
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_transaction(
        &mut self,
        id: i64,
        property: i64,
        client: i64,
        employee: i64,
        value: i64,
        commission: i64,
        date: NaiveDate,
    ) -> &mut Self {
        self.transactions.push(TransactionRec {
            id,
            property,
            client,
            employee,
            value: Decimal::from(value),
            commission: Decimal::from(commission),
            date,
        });
        self
    }

    pub fn add_cleaning(&mut self, property: i64, cost: i64) -> &mut Self {
        self.cleanings.push((property, Decimal::from(cost)));
        self
    }

    fn property(&self, id: i64) -> Option<&PropertyRec> {
        self.properties.iter().find(|p| p.id == id)
    }

    fn employee(&self, id: i64) -> Option<&EmployeeRec> {
        self.employees.iter().find(|e| e.id == id)
    }

    fn client(&self, id: i64) -> Option<&ClientRec> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn role_name(&self, id: i64) -> Option<String> {
        self.roles.get(&id).cloned()
    }

    fn rejected_write(&mut self, reason: &str) -> AppError {
        self.rollbacks += 1;
        AppError::Database(sqlx::Error::Protocol(reason.to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn top_sellers(&mut self) -> Result<Vec<TopSeller>, AppError> {
        self.calls += 1;
        let mut per_employee: BTreeMap<i64, (i64, Decimal)> = BTreeMap::new();
        for t in &self.transactions {
            let entry = per_employee.entry(t.employee).or_default();
            entry.0 += 1;
            entry.1 += t.value;
        }
        let mut rows: Vec<TopSeller> = per_employee
            .into_iter()
            .filter_map(|(id, (deals, total_value))| {
                let employee = self.employee(id)?;
                Some(TopSeller {
                    employee: employee.name.clone(),
                    role: self.role_name(employee.role_id)?,
                    deals,
                    total_value,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.total_value.cmp(&a.total_value));
        rows.truncate(5);
        Ok(rows)
    }

    async fn price_per_area(&mut self) -> Result<Vec<AreaPrice>, AppError> {
        self.calls += 1;
        let mut groups: BTreeMap<(String, String), Vec<Decimal>> = BTreeMap::new();
        for p in &self.properties {
            if let Some(area) = p.area.filter(|a| a.is_sign_positive() && !a.is_zero()) {
                groups
                    .entry((p.neighborhood.clone(), p.kind.clone()))
                    .or_default()
                    .push(p.price / area);
            }
        }
        let mut rows: Vec<AreaPrice> = groups
            .into_iter()
            .map(|((neighborhood, property_type), ratios)| AreaPrice {
                neighborhood,
                property_type,
                avg_price_per_m2: ratios.iter().sum::<Decimal>() / Decimal::from(ratios.len()),
            })
            .collect();
        rows.sort_by(|a, b| {
            a.neighborhood
                .cmp(&b.neighborhood)
                .then(b.avg_price_per_m2.cmp(&a.avg_price_per_m2))
        });
        Ok(rows)
    }

    async fn stale_listings(&mut self, days: i64) -> Result<Vec<StaleListing>, AppError> {
        self.calls += 1;
        let mut rows: Vec<StaleListing> = self
            .properties
            .iter()
            .filter(|p| p.status == STATUS_AVAILABLE)
            .map(|p| StaleListing {
                id: p.id,
                property_type: p.kind.clone(),
                address: p.address.clone(),
                days_listed: (self.today - p.listed).num_days(),
            })
            .filter(|row| row.days_listed > days)
            .collect();
        rows.sort_by(|a, b| b.days_listed.cmp(&a.days_listed));
        Ok(rows)
    }

    async fn conversion_average(&mut self) -> Result<Option<Decimal>, AppError> {
        self.calls += 1;
        let mut per_property: BTreeMap<i64, usize> = BTreeMap::new();
        for t in &self.transactions {
            let closed_at = t.date.and_hms_opt(0, 0, 0).unwrap_or_default();
            for v in self.visits.iter().filter(|v| v.property == t.property && v.at < closed_at) {
                *per_property.entry(v.property).or_default() += 1;
            }
        }
        if per_property.is_empty() {
            return Ok(None);
        }
        let total: usize = per_property.values().sum();
        Ok(Some(Decimal::from(total) / Decimal::from(per_property.len())))
    }

    async fn monthly_revenue(&mut self, year: i32) -> Result<Vec<MonthlyRevenue>, AppError> {
        self.calls += 1;
        let mut months: BTreeMap<u32, Decimal> = BTreeMap::new();
        for t in self.transactions.iter().filter(|t| t.date.year() == year) {
            *months.entry(t.date.month()).or_default() += t.commission;
        }
        Ok(months
            .into_iter()
            .map(|(month, commission)| MonthlyRevenue {
                month: month as i64,
                commission,
            })
            .collect())
    }

    async fn multi_property_owners(&mut self) -> Result<Vec<OwnerPortfolio>, AppError> {
        self.calls += 1;
        let mut rows: Vec<OwnerPortfolio> = self
            .owners
            .iter()
            .map(|o| OwnerPortfolio {
                owner: o.name.clone(),
                email: o.email.clone(),
                properties: self.owner_links.iter().filter(|(owner, _)| *owner == o.id).count() as i64,
            })
            .filter(|row| row.properties > 1)
            .collect();
        rows.sort_by(|a, b| b.properties.cmp(&a.properties));
        Ok(rows)
    }

    async fn cold_leads(&mut self) -> Result<Vec<ColdLead>, AppError> {
        self.calls += 1;
        let buyers: HashSet<i64> = self.transactions.iter().map(|t| t.client).collect();
        let visitors: HashSet<i64> = self.visits.iter().map(|v| v.client).collect();
        Ok(self
            .clients
            .iter()
            .filter(|c| visitors.contains(&c.id) && !buyers.contains(&c.id))
            .map(|c| ColdLead {
                client: c.name.clone(),
                email: c.email.clone(),
                phone: c.phone.clone(),
            })
            .collect())
    }

    async fn top_transaction(&mut self) -> Result<Option<TopTransaction>, AppError> {
        self.calls += 1;
        let Some(max) = self.transactions.iter().map(|t| t.value).max() else {
            return Ok(None);
        };
        let mut tied: Vec<&TransactionRec> = self.transactions.iter().filter(|t| t.value == max).collect();
        tied.sort_by_key(|t| t.id);
        Ok(tied.into_iter().find_map(|t| {
            let property = self.property(t.property)?;
            Some(TopTransaction {
                property_type: property.kind.clone(),
                address: property.address.clone(),
                value: t.value,
                broker: self.employee(t.employee)?.name.clone(),
                buyer: self.client(t.client)?.name.clone(),
            })
        }))
    }

    async fn occupancy(&mut self) -> Result<Vec<Occupancy>, AppError> {
        self.calls += 1;
        let mut groups: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for p in &self.properties {
            let entry = groups.entry(p.kind.clone()).or_default();
            entry.0 += 1;
            if p.status == STATUS_SOLD || p.status == STATUS_RENTED {
                entry.1 += 1;
            }
        }
        Ok(groups
            .into_iter()
            .map(|(property_type, (total, negotiated))| Occupancy {
                property_type,
                total,
                negotiated,
            })
            .collect())
    }

    async fn cleaning_costs(&mut self) -> Result<Vec<CleaningCost>, AppError> {
        self.calls += 1;
        let mut groups: BTreeMap<String, Decimal> = BTreeMap::new();
        for (property, cost) in &self.cleanings {
            if let Some(p) = self.property(*property) {
                *groups.entry(p.neighborhood.clone()).or_default() += *cost;
            }
        }
        let mut rows: Vec<CleaningCost> = groups
            .into_iter()
            .filter(|(_, total)| *total > Decimal::ZERO)
            .map(|(neighborhood, total_cost)| CleaningCost {
                neighborhood,
                total_cost,
            })
            .collect();
        rows.sort_by(|a, b| b.total_cost.cmp(&a.total_cost));
        Ok(rows)
    }

    async fn list_employees(&mut self) -> Result<Vec<Employee>, AppError> {
        self.calls += 1;
        let mut rows: Vec<Employee> = self
            .employees
            .iter()
            .filter_map(|e| {
                Some(Employee {
                    id: e.id,
                    name: e.name.clone(),
                    role: self.role_name(e.role_id)?,
                    phone: e.phone.clone(),
                    salary: e.salary,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_employee(&mut self, employee: &NewEmployee) -> Result<i64, AppError> {
        self.calls += 1;
        if self.fail_writes || !self.roles.contains_key(&employee.role_id) {
            return Err(self.rejected_write("simulated write failure"));
        }
        if self.senha_width.is_some_and(|width| employee.password_hash.len() > width) {
            return Err(self.rejected_write("Data too long for column 'senha' at row 1"));
        }
        let id = self.next_employee_id;
        self.next_employee_id += 1;
        self.employees.push(EmployeeRec {
            id,
            name: employee.name.clone(),
            phone: employee.phone.clone(),
            salary: employee.salary,
            role_id: employee.role_id,
            login: employee.login.clone(),
            password_hash: employee.password_hash.clone(),
        });
        self.commits += 1;
        Ok(id)
    }

    async fn update_salary(&mut self, update: SalaryUpdate) -> Result<u64, AppError> {
        self.calls += 1;
        if self.fail_writes {
            return Err(self.rejected_write("simulated write failure"));
        }
        let mut changed = 0;
        for e in self.employees.iter_mut().filter(|e| e.id == update.id) {
            e.salary = update.salary;
            changed += 1;
        }
        self.commits += 1;
        Ok(changed)
    }

    async fn delete_employee(&mut self, id: i64) -> Result<u64, AppError> {
        self.calls += 1;
        if self.fail_writes {
            return Err(self.rejected_write("simulated write failure"));
        }
        let before = self.employees.len();
        self.employees.retain(|e| e.id != id);
        self.commits += 1;
        Ok((before - self.employees.len()) as u64)
    }
}
