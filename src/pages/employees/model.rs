use super::*;

#[derive(Debug, Deserialize)]
pub(super) struct CreateEmployee {
    pub(super) dni: String,
    pub(super) name: String,
    pub(super) r#type: EmployeeType,
    pub(super) monthly_salary: Option<f64>,
    pub(super) photo: Option<String>,
}

/// Explicit partial update: absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub(super) struct UpdateEmployee {
    pub(super) dni: Option<String>,
    pub(super) name: Option<String>,
    pub(super) r#type: Option<EmployeeType>,
    pub(super) monthly_salary: Option<f64>,
    pub(super) photo: Option<String>,
    pub(super) remove_photo: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum StatsData {
    Production(ProductionStats),
    Salaried(SalariedStats),
}

#[derive(Debug, Serialize)]
pub(super) struct ProductionStats {
    pub(super) r#type: EmployeeType,
    pub(super) days_worked: u64,
    pub(super) despalillo: f64,
    pub(super) escogida: f64,
    pub(super) monado: f64,
    pub(super) total_despalillo: f64,
    pub(super) total_escogida: f64,
    pub(super) total_monado: f64,
    pub(super) saturday_bonus: f64,
    pub(super) seventh_day: f64,
    pub(super) net_pay: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct SalariedStats {
    pub(super) r#type: EmployeeType,
    pub(super) days_worked: u64,
    pub(super) hours_extra: f64,
    pub(super) hours_extra_money: f64,
    pub(super) daily_salary: f64,
    pub(super) seventh_day: f64,
    pub(super) net_pay: f64,
}
