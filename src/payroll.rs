//! Pay math for the two compensation schemes.
//!
//! Piece-rate ("producción") workers earn per processed unit across three
//! tasks plus two statutory rest-day accruals; day-rate ("al día") workers
//! earn a prorated monthly salary plus overtime and a seventh day once they
//! reach five worked days. Rounding happens at the exact points written out
//! below — subtotals stay full precision, each accrual is rounded on its
//! own, and the net is rounded again after summing the rounded parts.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    consts::{
        DESPALILLO_RATE, ESCOGIDA_RATE, MONADO_RATE, OVERTIME_MULTIPLIER, SALARIED_DAYS_PER_MONTH,
        SALARIED_HOURS_PER_DAY, SATURDAY_BONUS_FACTOR, SEVENTH_DAY_FACTOR, SEVENTH_DAY_MIN_DAYS,
    },
    entity::{attendance, employee, sea_orm_active_enums::EmployeeType},
};

/// Round to currency precision (2 decimals).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quantities coming off the scanner station can be absent, negative or
/// garbage; anything that is not a positive finite number counts as zero.
pub fn coerce_quantity(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductionTally {
    pub despalillo: f64,
    pub escogida: f64,
    pub monado: f64,
    pub days_worked: u64,
}

impl ProductionTally {
    pub fn add_record(&mut self, record: &attendance::Model) {
        self.despalillo += coerce_quantity(record.despalillo);
        self.escogida += coerce_quantity(record.escogida);
        self.monado += coerce_quantity(record.monado);
        self.days_worked += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionPay {
    pub total_despalillo: f64,
    pub total_escogida: f64,
    pub total_monado: f64,
    pub production_money: f64,
    pub saturday_bonus: f64,
    pub seventh_day: f64,
    pub net_pay: f64,
}

pub fn production_pay(tally: &ProductionTally) -> ProductionPay {
    let total_despalillo = tally.despalillo * DESPALILLO_RATE;
    let total_escogida = tally.escogida * ESCOGIDA_RATE;
    let total_monado = tally.monado * MONADO_RATE;

    let production_money = total_despalillo + total_escogida + total_monado;

    let saturday_bonus = round2(production_money * SATURDAY_BONUS_FACTOR);
    let seventh_day = round2(production_money * SEVENTH_DAY_FACTOR);
    let net_pay = round2(production_money + saturday_bonus + seventh_day);

    ProductionPay {
        total_despalillo,
        total_escogida,
        total_monado,
        production_money,
        saturday_bonus,
        seventh_day,
        net_pay,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SalariedTally {
    pub hours_extra: f64,
    pub days_worked: u64,
}

impl SalariedTally {
    pub fn add_record(&mut self, record: &attendance::Model) {
        self.hours_extra += coerce_quantity(record.hours_extra);
        self.days_worked += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalariedPay {
    /// Prorated day wage, rounded for display; the net below is computed
    /// from the unrounded value.
    pub daily_salary: f64,
    pub hours_extra_money: f64,
    pub seventh_day: f64,
    pub net_pay: f64,
}

pub fn salaried_pay(monthly_salary: f64, tally: &SalariedTally) -> SalariedPay {
    let daily_salary = monthly_salary / SALARIED_DAYS_PER_MONTH;
    let hourly_rate = daily_salary / SALARIED_HOURS_PER_DAY;
    let overtime_rate = hourly_rate * OVERTIME_MULTIPLIER;

    let hours_extra_money = round2(coerce_quantity(tally.hours_extra) * overtime_rate);
    let seventh_day = if tally.days_worked >= SEVENTH_DAY_MIN_DAYS {
        round2(daily_salary)
    } else {
        0.0
    };
    let net_pay = round2(tally.days_worked as f64 * daily_salary + hours_extra_money + seventh_day);

    SalariedPay {
        daily_salary: round2(daily_salary),
        hours_extra_money,
        seventh_day,
        net_pay,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeTally {
    Production(ProductionTally),
    Salaried(SalariedTally),
}

/// Group attendance rows by employee and accumulate the quantities the pay
/// formulas need. `days_worked` counts every row once, whatever the scheme.
/// Output is ordered by employee name (then id, so equal names stay
/// deterministic); only employees with at least one row appear.
pub fn tally_by_employee(
    rows: Vec<(attendance::Model, employee::Model)>,
) -> Vec<(employee::Model, EmployeeTally)> {
    let mut grouped: HashMap<Uuid, (employee::Model, EmployeeTally)> = HashMap::new();

    for (record, employee) in rows {
        let id = employee.id;
        let (_, tally) = grouped.entry(id).or_insert_with(|| {
            let tally = match employee.r#type {
                EmployeeType::Produccion => EmployeeTally::Production(ProductionTally::default()),
                EmployeeType::AlDia => EmployeeTally::Salaried(SalariedTally::default()),
            };

            (employee, tally)
        });

        match tally {
            EmployeeTally::Production(tally) => tally.add_record(&record),
            EmployeeTally::Salaried(tally) => tally.add_record(&record),
        }
    }

    let mut entries: Vec<_> = grouped.into_values().collect();
    entries.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    entries
}

#[cfg(test)]
pub(crate) fn test_employee(name: &str, r#type: EmployeeType, monthly_salary: f64) -> employee::Model {
    use chrono::Local;
    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(name.as_bytes());
    let mut id_bytes = [0u8; 16];
    id_bytes.copy_from_slice(&digest[..16]);

    employee::Model {
        id: Uuid::from_bytes(id_bytes),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        dni: "0801199900123".to_string(),
        name: name.to_string(),
        r#type,
        monthly_salary,
        photo: None,
        qr_code: None,
        is_active: true,
    }
}

#[cfg(test)]
pub(crate) fn test_record(
    employee: &employee::Model,
    quantities: (f64, f64, f64, f64),
) -> attendance::Model {
    use chrono::{Local, NaiveDate};

    let (despalillo, escogida, monado, hours_extra) = quantities;

    attendance::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        employee_id: employee.id,
        date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
        entry_time: Local::now().into(),
        exit_time: Some(Local::now().into()),
        hours_extra,
        despalillo,
        escogida,
        monado,
    }
}
