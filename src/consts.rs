/// Lempiras paid per processed unit, by task.
pub const DESPALILLO_RATE: f64 = 80.0;
pub const ESCOGIDA_RATE: f64 = 70.0;
pub const MONADO_RATE: f64 = 1.0;

/// Rest-day accrual factors for piece-rate workers (1/11 and 2/11 over a
/// six-day week). The payroll office works with these literal decimals.
pub const SATURDAY_BONUS_FACTOR: f64 = 0.090909;
pub const SEVENTH_DAY_FACTOR: f64 = 0.181818;

/// Day-rate salaries are prorated over a 30-day month and an 8-hour day.
pub const SALARIED_DAYS_PER_MONTH: f64 = 30.0;
pub const SALARIED_HOURS_PER_DAY: f64 = 8.0;
pub const OVERTIME_MULTIPLIER: f64 = 1.25;

/// Days worked in the period before the seventh day is owed.
pub const SEVENTH_DAY_MIN_DAYS: u64 = 5;

/// Honduran DNI length, digits only.
pub const DNI_LEN: usize = 13;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const TOKEN_TTL_HOURS: i64 = 24;
