use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type EmployeeId = String;
pub type Employees = BTreeMap<EmployeeId, Employee>;
pub type ShiftMap = BTreeMap<NaiveDate, ShiftRecord>;
pub type Schedules = BTreeMap<EmployeeId, ShiftMap>;
pub type TaskBuckets = BTreeMap<TaskKey, Vec<TaskRecord>>;

/// Current time at the millisecond precision timestamps are stored with
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Calendar colors handed out to new employees, cycled by employee count
pub const EMPLOYEE_COLORS: [&str; 12] = [
    "#58a6ff", "#79c0ff", "#d2a8ff", "#ffa8f8",
    "#f8c73c", "#ff7b72", "#a5ff7b", "#ff8cdc",
    "#56d364", "#ffa657", "#6e7681", "#bc8cff",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub rate: f64, // per hour
    pub color: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(id: EmployeeId, name: String, rate: f64, color: String) -> Self {
        Self {
            id,
            name,
            rate,
            color,
            created_at: now_millis(),
        }
    }

    /// First word of the display name, used where cells are narrow
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Day,
    Night,
    Custom,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown shift type '{0}' (expected day, night or custom)")]
pub struct ShiftTypeError(pub String);

impl ShiftType {
    pub const ALL: [ShiftType; 3] = [ShiftType::Day, ShiftType::Night, ShiftType::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Day => "day",
            ShiftType::Night => "night",
            ShiftType::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Day => "Day",
            ShiftType::Night => "Night",
            ShiftType::Custom => "Custom",
        }
    }

    /// Display color for calendar cells
    pub fn color(&self) -> &'static str {
        match self {
            ShiftType::Day => "#238636",
            ShiftType::Night => "#f85149",
            ShiftType::Custom => "#8957e5",
        }
    }

    pub fn next(&self) -> ShiftType {
        match self {
            ShiftType::Day => ShiftType::Night,
            ShiftType::Night => ShiftType::Custom,
            ShiftType::Custom => ShiftType::Day,
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = ShiftTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(ShiftType::Day),
            "night" => Ok(ShiftType::Night),
            "custom" => Ok(ShiftType::Custom),
            other => Err(ShiftTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub hours: f64,
    #[serde(rename = "type")]
    pub kind: ShiftType,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ShiftRecord {
    pub fn new(hours: f64, kind: ShiftType, notes: String) -> Self {
        Self {
            hours,
            kind,
            notes,
            updated_at: now_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub text: String,
    #[serde(default)]
    pub report: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(text: String) -> Self {
        let now = now_millis();
        Self {
            text,
            report: String::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Completed, or carries a written report. Day summaries count tasks this way,
    /// which is looser than the `completed` flag alone.
    pub fn is_addressed(&self) -> bool {
        self.completed || !self.report.trim().is_empty()
    }
}

/// Identifies a task bucket: one employee on one date.
///
/// On the wire the key is the string `"<employee id>:<YYYY-MM-DD>"`, so it can be used
/// as a JSON object key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskKeyError {
    #[error("Task key '{0}' is missing the ':' separator")]
    MissingSeparator(String),
    #[error("Task key '{0}' has an empty employee id")]
    EmptyEmployee(String),
    #[error("Task key '{0}' has an invalid date")]
    InvalidDate(String),
}

impl TaskKey {
    pub fn new(employee_id: impl Into<EmployeeId>, date: NaiveDate) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.employee_id, self.date.format("%Y-%m-%d"))
    }
}

impl FromStr for TaskKey {
    type Err = TaskKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Dates never contain ':', so the last separator splits the key
        let (employee_id, date) = s
            .rsplit_once(':')
            .ok_or_else(|| TaskKeyError::MissingSeparator(s.to_string()))?;
        if employee_id.is_empty() {
            return Err(TaskKeyError::EmptyEmployee(s.to_string()));
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| TaskKeyError::InvalidDate(s.to_string()))?;
        Ok(TaskKey::new(employee_id, date))
    }
}

impl Serialize for TaskKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub day_shift_hours: f64,
    pub night_shift_hours: f64,
    pub default_hourly_rate: f64,
    /// 0 = Sunday .. 6 = Saturday
    pub start_of_week: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            day_shift_hours: 12.0,
            night_shift_hours: 12.0,
            default_hourly_rate: 500.0,
            start_of_week: 1,
        }
    }
}

impl Settings {
    /// Hours used for a shift of the given type when none are entered.
    /// Custom shifts have no default.
    pub fn default_hours(&self, kind: ShiftType) -> Option<f64> {
        match kind {
            ShiftType::Day => Some(self.day_shift_hours),
            ShiftType::Night => Some(self.night_shift_hours),
            ShiftType::Custom => None,
        }
    }
}

/// Whole persisted state, as exchanged with storage backends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub employees: Employees,
    #[serde(default)]
    pub schedules: Schedules,
    #[serde(default)]
    pub tasks: TaskBuckets,
    #[serde(default)]
    pub settings: Settings,
}

/// Contents of the local backup slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub backup_date: DateTime<Utc>,
}

impl Backup {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            backup_date: Utc::now(),
        }
    }
}
