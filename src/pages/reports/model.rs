use super::*;

#[derive(Debug, Deserialize)]
pub(super) struct RangeQuery {
    pub(super) start_date: Date,
    pub(super) end_date: Date,
}

#[derive(Debug, Deserialize)]
pub(super) struct DateQuery {
    pub(super) date: Date,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct DayPresence {
    pub(super) date: Date,
    pub(super) present_count: u64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub(super) struct ProductionTotals {
    pub(super) total_despalillo: f64,
    pub(super) total_escogida: f64,
    pub(super) total_monado: f64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub(super) struct AlDiaTotals {
    pub(super) total_hours_extra: f64,
    pub(super) total_days_worked: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct ProductionEntry {
    pub(super) employee_id: Uuid,
    pub(super) employee: String,
    pub(super) dni: String,
    pub(super) r#type: EmployeeType,
    pub(super) despalillo: f64,
    pub(super) escogida: f64,
    pub(super) monado: f64,
    pub(super) production_money: f64,
    pub(super) saturday_bonus: f64,
    pub(super) seventh_day: f64,
    pub(super) net_pay: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct AlDiaEntry {
    pub(super) employee_id: Uuid,
    pub(super) employee: String,
    pub(super) dni: String,
    pub(super) r#type: EmployeeType,
    pub(super) days_worked: u64,
    pub(super) hours_extra: f64,
    pub(super) hours_extra_money: f64,
    pub(super) seventh_day: f64,
    pub(super) daily_salary: f64,
    pub(super) net_pay: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct PayrollSummary {
    pub(super) total_employees: usize,
    pub(super) total_production_payroll: f64,
    pub(super) total_aldia_payroll: f64,
    pub(super) total_payroll: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct WeeklyData {
    pub(super) summary_by_day: Vec<DayPresence>,
    pub(super) production_totals: ProductionTotals,
    pub(super) al_dia_totals: AlDiaTotals,
    pub(super) production: Vec<ProductionEntry>,
    pub(super) al_dia: Vec<AlDiaEntry>,
    pub(super) summary: PayrollSummary,
}

#[derive(Debug, Serialize)]
pub(super) struct DailyRow {
    pub(super) id: Uuid,
    pub(super) employee_id: Uuid,
    pub(super) employee_name: String,
    pub(super) employee_type: EmployeeType,
    pub(super) monthly_salary: f64,
    pub(super) date: Date,
    pub(super) hours_extra: f64,
    pub(super) exit_time: Option<DateTimeWithTimeZone>,
}

#[derive(Debug, Serialize)]
pub(super) struct DashboardDailyRow {
    pub(super) employee_id: Uuid,
    pub(super) employee: String,
    pub(super) employee_type: EmployeeType,
    pub(super) despalillo: f64,
    pub(super) escogida: f64,
    pub(super) monado: f64,
    pub(super) hours_extra: f64,
    pub(super) entry_time: DateTimeWithTimeZone,
    pub(super) exit_time: Option<DateTimeWithTimeZone>,
}

#[derive(Debug, Default, Serialize)]
pub(super) struct DailyProductionTotals {
    pub(super) despalillo: f64,
    pub(super) escogida: f64,
    pub(super) monado: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct PendingEntry {
    pub(super) employee_id: Uuid,
    pub(super) employee_name: String,
    pub(super) employee_type: EmployeeType,
    pub(super) photo: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PendingExit {
    pub(super) employee_id: Uuid,
    pub(super) employee_name: String,
    pub(super) employee_type: EmployeeType,
    pub(super) entry_time: DateTimeWithTimeZone,
    pub(super) photo: Option<String>,
}
