use serde::{Deserialize, Serialize};

/// Persistent GPU selection for an executable.
///
/// Discriminants match the numbers Windows stores for the DirectX user GPU
/// preference.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GpuPreference {
    Default = 0,
    PowerSaving = 1,
    #[default]
    HighPerformance = 2,
}

impl GpuPreference {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Default),
            1 => Some(Self::PowerSaving),
            2 => Some(Self::HighPerformance),
            _ => None,
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }
}
