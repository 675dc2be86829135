use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlConnection},
    Connection,
};

use crate::{
    config::DbSettings,
    errors::{AppError, ValidationError},
    structs::{
        AreaPrice, CleaningCost, ColdLead, Employee, MonthlyRevenue, NewEmployee, Occupancy,
        OwnerPortfolio, SalaryUpdate, StaleListing, TopSeller, TopTransaction, STATUS_AVAILABLE,
        STATUS_RENTED, STATUS_SOLD,
    },
};

#[cfg(test)]
pub mod memory;

/// One method per statement the application issues.
#[async_trait]
pub trait Store: Send {
    async fn top_sellers(&mut self) -> Result<Vec<TopSeller>, AppError>;
    async fn price_per_area(&mut self) -> Result<Vec<AreaPrice>, AppError>;
    async fn stale_listings(&mut self, days: i64) -> Result<Vec<StaleListing>, AppError>;
    /// `None` when no transacted property had a visit before its transaction.
    async fn conversion_average(&mut self) -> Result<Option<Decimal>, AppError>;
    async fn monthly_revenue(&mut self, year: i32) -> Result<Vec<MonthlyRevenue>, AppError>;
    async fn multi_property_owners(&mut self) -> Result<Vec<OwnerPortfolio>, AppError>;
    async fn cold_leads(&mut self) -> Result<Vec<ColdLead>, AppError>;
    async fn top_transaction(&mut self) -> Result<Option<TopTransaction>, AppError>;
    async fn occupancy(&mut self) -> Result<Vec<Occupancy>, AppError>;
    async fn cleaning_costs(&mut self) -> Result<Vec<CleaningCost>, AppError>;

    async fn list_employees(&mut self) -> Result<Vec<Employee>, AppError>;
    /// Returns the generated id.
    async fn insert_employee(&mut self, employee: &NewEmployee) -> Result<i64, AppError>;
    /// Returns the number of rows changed.
    async fn update_salary(&mut self, update: SalaryUpdate) -> Result<u64, AppError>;
    /// Returns the number of rows removed.
    async fn delete_employee(&mut self, id: i64) -> Result<u64, AppError>;
}

const TOP_SELLERS: &str = r#"
SELECT f.nome_funcionario AS employee, c.nome_cargo AS role,
       COUNT(t.idTransacao) AS deals,
       SUM(t.valor_real_negocio) AS total_value
FROM transacao t
JOIN funcionario f ON t.idFuncionario = f.idFuncionario
JOIN cargo c ON f.idCargo = c.idCargo
GROUP BY f.idFuncionario, f.nome_funcionario, c.nome_cargo
ORDER BY total_value DESC
LIMIT 5
"#;

// Ratio per unit first, then the average of the ratios.
const PRICE_PER_AREA: &str = r#"
SELECT bairro_imovel AS neighborhood, tipo_imovel AS property_type,
       AVG(valor_sugerido / area) AS avg_price_per_m2
FROM (
    SELECT i.bairro_imovel, i.tipo_imovel, i.valor_sugerido, c.area
    FROM imovel i JOIN casa c ON i.idImovel = c.idImovel
    WHERE c.area > 0
    UNION ALL
    SELECT i.bairro_imovel, i.tipo_imovel, i.valor_sugerido, a.area
    FROM imovel i JOIN apartamento a ON i.idImovel = a.idImovel
    WHERE a.area > 0
) AS units
GROUP BY bairro_imovel, tipo_imovel
ORDER BY bairro_imovel, avg_price_per_m2 DESC
"#;

const STALE_LISTINGS: &str = r#"
SELECT CAST(idImovel AS SIGNED) AS id, tipo_imovel AS property_type,
       endereco_imovel AS address,
       CAST(DATEDIFF(CURDATE(), data_anuncio) AS SIGNED) AS days_listed
FROM imovel
WHERE status_disponibilidade = ?
  AND DATEDIFF(CURDATE(), data_anuncio) > ?
ORDER BY days_listed DESC
"#;

const CONVERSION_AVERAGE: &str = r#"
SELECT AVG(total_visits)
FROM (
    SELECT t.idImovel, COUNT(v.idVisita) AS total_visits
    FROM transacao t
    JOIN visita v ON t.idImovel = v.idImovel
    WHERE v.data_horario < t.data_transacao
    GROUP BY t.idImovel
) AS visits_per_property
"#;

const MONTHLY_REVENUE: &str = r#"
SELECT CAST(MONTH(data_transacao) AS SIGNED) AS month,
       SUM(valor_comissao_imobiliaria) AS commission
FROM transacao
WHERE YEAR(data_transacao) = ?
GROUP BY month
ORDER BY month
"#;

const MULTI_PROPERTY_OWNERS: &str = r#"
SELECT p.nome_proprietario AS owner, COALESCE(p.email_proprietario, '') AS email,
       COUNT(pi.idImovel) AS properties
FROM proprietario p
JOIN proprietario_imovel pi ON p.idProprietario = pi.idProprietario
GROUP BY p.idProprietario, p.nome_proprietario, p.email_proprietario
HAVING properties > 1
ORDER BY properties DESC
"#;

const COLD_LEADS: &str = r#"
SELECT DISTINCT c.nome_cliente AS client, COALESCE(c.email_cliente, '') AS email,
       COALESCE(c.telefone_cliente, '') AS phone
FROM cliente c
JOIN visita v ON c.idCliente = v.idCliente
WHERE c.idCliente NOT IN (SELECT idCliente FROM transacao WHERE idCliente IS NOT NULL)
"#;

const TOP_TRANSACTION: &str = r#"
SELECT i.tipo_imovel AS property_type, i.endereco_imovel AS address,
       t.valor_real_negocio AS value,
       f.nome_funcionario AS broker, c.nome_cliente AS buyer
FROM transacao t
JOIN imovel i ON t.idImovel = i.idImovel
JOIN funcionario f ON t.idFuncionario = f.idFuncionario
JOIN cliente c ON t.idCliente = c.idCliente
WHERE t.valor_real_negocio = (SELECT MAX(valor_real_negocio) FROM transacao)
ORDER BY t.idTransacao
LIMIT 1
"#;

const OCCUPANCY: &str = r#"
SELECT tipo_imovel AS property_type, COUNT(idImovel) AS total,
       CAST(SUM(CASE WHEN status_disponibilidade IN (?, ?) THEN 1 ELSE 0 END) AS SIGNED) AS negotiated
FROM imovel
GROUP BY tipo_imovel
"#;

const CLEANING_COSTS: &str = r#"
SELECT i.bairro_imovel AS neighborhood, SUM(l.custo_servico) AS total_cost
FROM limpeza l
JOIN imovel i ON l.idImovel = i.idImovel
GROUP BY i.bairro_imovel
HAVING SUM(l.custo_servico) > 0
ORDER BY total_cost DESC
"#;

const LIST_EMPLOYEES: &str = r#"
SELECT CAST(f.idFuncionario AS SIGNED) AS id, f.nome_funcionario AS name,
       c.nome_cargo AS role, COALESCE(f.celular_funcionario, '') AS phone,
       f.salario AS salary
FROM funcionario f
JOIN cargo c ON f.idCargo = c.idCargo
ORDER BY f.nome_funcionario
"#;

const INSERT_EMPLOYEE: &str = r#"
INSERT INTO funcionario (nome_funcionario, cpf_funcionario, endereco_funcionario,
    celular_funcionario, data_admissao, salario, usuario, senha, idCargo)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_SALARY: &str = "UPDATE funcionario SET salario = ? WHERE idFuncionario = ?";

const DELETE_EMPLOYEE: &str = "DELETE FROM funcionario WHERE idFuncionario = ?";

/// Opens the single session used for the lifetime of the process.
pub async fn open(settings: &DbSettings, user: &str, password: &str) -> Result<MySqlStore, AppError> {
    if settings.host.trim().is_empty() {
        return Err(ValidationError::Empty { field: "Database host" }.into());
    }
    if settings.database.trim().is_empty() {
        return Err(ValidationError::Empty { field: "Database name" }.into());
    }
    if user.trim().is_empty() {
        return Err(ValidationError::Empty { field: "Database user" }.into());
    }
    if password.is_empty() {
        return Err(ValidationError::Empty { field: "Database password" }.into());
    }

    let opts = MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(user.trim())
        .password(password)
        .database(&settings.database);

    let conn = MySqlConnection::connect_with(&opts).await.map_err(|e| {
        log::error!("Failed to connect to {}:{}: {}", settings.host, settings.port, e);
        AppError::Connection(e)
    })?;

    log::info!("Connected to {}:{}/{}", settings.host, settings.port, settings.database);
    Ok(MySqlStore { conn })
}

pub struct MySqlStore {
    conn: MySqlConnection,
}

impl MySqlStore {
    pub async fn close(self) -> Result<(), AppError> {
        self.conn.close().await?;
        log::info!("Database session closed");
        Ok(())
    }

    /// Runs one write statement in its own transaction: commit when it
    /// succeeds, roll back when it fails.
    async fn write<'q>(
        &mut self,
        query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    ) -> Result<sqlx::mysql::MySqlQueryResult, AppError> {
        let mut tx = self.conn.begin().await?;
        match query.execute(&mut *tx).await {
            Ok(done) => {
                tx.commit().await?;
                log::info!("Committed, {} row(s) affected", done.rows_affected());
                Ok(done)
            }
            Err(e) => {
                log::error!("Statement failed, rolling back: {}", e);
                if let Err(rb) = tx.rollback().await {
                    log::error!("Rollback failed: {}", rb);
                }
                Err(AppError::Database(e))
            }
        }
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn top_sellers(&mut self) -> Result<Vec<TopSeller>, AppError> {
        let rows = sqlx::query_as::<_, TopSeller>(TOP_SELLERS)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn price_per_area(&mut self) -> Result<Vec<AreaPrice>, AppError> {
        let rows = sqlx::query_as::<_, AreaPrice>(PRICE_PER_AREA)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn stale_listings(&mut self, days: i64) -> Result<Vec<StaleListing>, AppError> {
        let rows = sqlx::query_as::<_, StaleListing>(STALE_LISTINGS)
            .bind(STATUS_AVAILABLE)
            .bind(days)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn conversion_average(&mut self) -> Result<Option<Decimal>, AppError> {
        let avg = sqlx::query_scalar::<_, Option<Decimal>>(CONVERSION_AVERAGE)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(avg)
    }

    async fn monthly_revenue(&mut self, year: i32) -> Result<Vec<MonthlyRevenue>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(MONTHLY_REVENUE)
            .bind(year)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn multi_property_owners(&mut self) -> Result<Vec<OwnerPortfolio>, AppError> {
        let rows = sqlx::query_as::<_, OwnerPortfolio>(MULTI_PROPERTY_OWNERS)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn cold_leads(&mut self) -> Result<Vec<ColdLead>, AppError> {
        let rows = sqlx::query_as::<_, ColdLead>(COLD_LEADS)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn top_transaction(&mut self) -> Result<Option<TopTransaction>, AppError> {
        let row = sqlx::query_as::<_, TopTransaction>(TOP_TRANSACTION)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(row)
    }

    async fn occupancy(&mut self) -> Result<Vec<Occupancy>, AppError> {
        let rows = sqlx::query_as::<_, Occupancy>(OCCUPANCY)
            .bind(STATUS_SOLD)
            .bind(STATUS_RENTED)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn cleaning_costs(&mut self) -> Result<Vec<CleaningCost>, AppError> {
        let rows = sqlx::query_as::<_, CleaningCost>(CLEANING_COSTS)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn list_employees(&mut self) -> Result<Vec<Employee>, AppError> {
        let rows = sqlx::query_as::<_, Employee>(LIST_EMPLOYEES)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows)
    }

    async fn insert_employee(&mut self, employee: &NewEmployee) -> Result<i64, AppError> {
        let query = sqlx::query(INSERT_EMPLOYEE)
            .bind(employee.name.clone())
            .bind(employee.cpf.clone())
            .bind(employee.address.clone())
            .bind(employee.phone.clone())
            .bind(employee.admission_date)
            .bind(employee.salary)
            .bind(employee.login.clone())
            .bind(employee.password_hash.clone())
            .bind(employee.role_id);
        let done = self.write(query).await?;
        log::info!("Employee created with id {}", done.last_insert_id());
        Ok(done.last_insert_id() as i64)
    }

    async fn update_salary(&mut self, update: SalaryUpdate) -> Result<u64, AppError> {
        let query = sqlx::query(UPDATE_SALARY).bind(update.salary).bind(update.id);
        Ok(self.write(query).await?.rows_affected())
    }

    async fn delete_employee(&mut self, id: i64) -> Result<u64, AppError> {
        let query = sqlx::query(DELETE_EMPLOYEE).bind(id);
        Ok(self.write(query).await?.rows_affected())
    }
}
