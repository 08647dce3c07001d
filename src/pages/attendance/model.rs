use super::*;

#[derive(Debug, Deserialize)]
pub(super) struct RecordEntry {
    pub(super) employee_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecordExit {
    pub(super) employee_id: Uuid,
    #[serde(default)]
    pub(super) hours_extra: f64,
    #[serde(default)]
    pub(super) despalillo: f64,
    #[serde(default)]
    pub(super) escogida: f64,
    #[serde(default)]
    pub(super) monado: f64,
}

impl RecordExit {
    /// Quantities are exclusive by compensation scheme. Whatever does not
    /// apply to this employee is stored as zero, never rejected; negatives
    /// and non-numbers are zeroed too.
    pub(super) fn quantities_for(&self, r#type: &EmployeeType) -> (f64, f64, f64, f64) {
        match r#type {
            EmployeeType::AlDia => (coerce_quantity(self.hours_extra), 0.0, 0.0, 0.0),
            EmployeeType::Produccion => (
                0.0,
                coerce_quantity(self.despalillo),
                coerce_quantity(self.escogida),
                coerce_quantity(self.monado),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct EntryResponse {
    pub(super) success: bool,
    pub(super) message: String,
    pub(super) data: EntryData,
}

#[derive(Debug, Serialize)]
pub(super) struct EntryData {
    pub(super) id: Uuid,
    pub(super) employee_id: Uuid,
    pub(super) employee_name: String,
    pub(super) employee_type: EmployeeType,
    pub(super) date: Date,
    pub(super) entry_time: DateTimeWithTimeZone,
    pub(super) status: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct TodayRecord {
    pub(super) id: Uuid,
    pub(super) employee_id: Uuid,
    pub(super) employee_name: String,
    pub(super) employee_dni: String,
    pub(super) employee_type: EmployeeType,
    pub(super) photo: Option<String>,
    pub(super) entry_time: DateTimeWithTimeZone,
    pub(super) exit_time: Option<DateTimeWithTimeZone>,
    pub(super) entry_time_display: String,
    pub(super) exit_time_display: String,
    pub(super) date: Date,
    pub(super) is_working: bool,
    pub(super) status: &'static str,
    pub(super) hours_extra: f64,
    pub(super) despalillo: f64,
    pub(super) escogida: f64,
    pub(super) monado: f64,
}
