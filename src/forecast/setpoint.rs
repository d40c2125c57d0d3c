//! Hourly HVAC setpoint schedules sent as consumption attributes

use serde::{Deserialize, Serialize, Serializer};

/// Number of hourly slots in a schedule
pub const HOURS_PER_DAY: usize = 24;

/// Controlled HVAC variable
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Heating,
    Cooling,
}

impl HvacMode {
    /// Temperature held outside the active window, chosen so the system stays idle
    pub const fn off_value(self) -> i32 {
        match self {
            Self::Heating => 10,
            Self::Cooling => 38,
        }
    }

    /// Attribute name understood by the forecasting API
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Self::Heating => "hvac_heating_setpoint",
            Self::Cooling => "hvac_cooling_setpoint",
        }
    }
}

/// A 24-slot per-hour setpoint schedule, serialized as `{"name", "value"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetpointSchedule {
    #[serde(rename = "name", serialize_with = "serialize_attribute_name")]
    mode: HvacMode,
    value: [i32; HOURS_PER_DAY],
}

fn serialize_attribute_name<S: Serializer>(
    mode: &HvacMode,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(mode.attribute_name())
}

impl SetpointSchedule {
    /// Build a schedule holding `setpoint` for `duration_hours` hours from
    /// `start_hour`, wrapping past midnight; every other hour keeps the
    /// mode's off value. Start hours wrap modulo 24 in both directions and a
    /// non-positive duration leaves the schedule off.
    pub fn generate(mode: HvacMode, start_hour: i64, duration_hours: i64, setpoint: i32) -> Self {
        let mut value = [mode.off_value(); HOURS_PER_DAY];
        let day = HOURS_PER_DAY as i64;
        let start = start_hour.rem_euclid(day);
        // Past one full cycle every slot already holds the setpoint
        for offset in 0..duration_hours.clamp(0, day) {
            value[((start + offset) % day) as usize] = setpoint;
        }
        Self { mode, value }
    }

    pub fn name(&self) -> &'static str {
        self.mode.attribute_name()
    }

    /// Setpoint at a given hour of day (0-23)
    pub fn at(&self, hour: usize) -> Option<i32> {
        self.value.get(hour).copied()
    }

    /// Number of hours holding something other than the off value
    pub fn active_hours(&self) -> usize {
        let off = self.mode.off_value();
        self.value.iter().filter(|v| **v != off).count()
    }
}

/// Heating schedule, off value 10
pub fn heating(start_hour: i64, duration_hours: i64, setpoint: i32) -> SetpointSchedule {
    SetpointSchedule::generate(HvacMode::Heating, start_hour, duration_hours, setpoint)
}

/// Cooling schedule, off value 38
pub fn cooling(start_hour: i64, duration_hours: i64, setpoint: i32) -> SetpointSchedule {
    SetpointSchedule::generate(HvacMode::Cooling, start_hour, duration_hours, setpoint)
}
