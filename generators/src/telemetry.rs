//! Facility telemetry: badge-ins at the gates and temperature sensors.

use chrono::{DateTime, Utc};
use datagen_core::config::TelemetryConfig;
use datagen_core::envelope::Emission;
use datagen_core::events::{BadgeIn, EventKind, EventPayload, SensorReading};
use datagen_core::variates::{double_between, int_between, pick};
use rand::RngCore;
use rand::rngs::SmallRng;
use smallvec::{SmallVec, smallvec};
use std::time::Duration;

use crate::series::EventGenerator;

/// Employees badging in at facility gates.
pub struct BadgeInGenerator {
    cfg: TelemetryConfig,
    rng: SmallRng,
}

impl BadgeInGenerator {
    /// Creates the generator.
    #[must_use]
    pub const fn new(cfg: TelemetryConfig, rng: SmallRng) -> Self {
        Self { cfg, rng }
    }
}

impl EventGenerator for BadgeInGenerator {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.cfg.badge_interval_ms)
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::BadgeIn
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let employee_idx = int_between(
            &mut self.rng,
            0,
            self.cfg.employees.len() as i64 - 1,
        ) as usize;
        let badge = BadgeIn {
            id: format!("badge-{:08x}", self.rng.next_u32()),
            badge_id: format!("emp-{employee_idx:03}"),
            employee_name: self.cfg.employees[employee_idx].clone(),
            gate: pick(&mut self.rng, &self.cfg.gates).clone(),
            timestamp: at,
        };
        smallvec![Emission::now(EventPayload::BadgeIn(badge))]
    }
}

/// Temperature sensors; one generator instance per reading regime.
pub struct SensorReadingGenerator {
    cfg: TelemetryConfig,
    rng: SmallRng,
    anomalous: bool,
}

impl SensorReadingGenerator {
    /// Readings within the normal operating range.
    #[must_use]
    pub const fn normal(cfg: TelemetryConfig, rng: SmallRng) -> Self {
        Self {
            cfg,
            rng,
            anomalous: false,
        }
    }

    /// Sporadic readings in the anomalous range, flagged as such.
    #[must_use]
    pub const fn anomalous(cfg: TelemetryConfig, rng: SmallRng) -> Self {
        Self {
            cfg,
            rng,
            anomalous: true,
        }
    }
}

impl EventGenerator for SensorReadingGenerator {
    fn interval(&self) -> Duration {
        if self.anomalous {
            Duration::from_millis(self.cfg.anomaly_interval_ms)
        } else {
            Duration::from_millis(self.cfg.sensor_interval_ms)
        }
    }

    fn policy_kind(&self) -> EventKind {
        EventKind::SensorReading
    }

    fn produce(&mut self, at: DateTime<Utc>) -> SmallVec<[Emission; 4]> {
        let (min, max) = if self.anomalous {
            (self.cfg.anomalous_min, self.cfg.anomalous_max)
        } else {
            (self.cfg.normal_min, self.cfg.normal_max)
        };
        let sensor = int_between(&mut self.rng, 0, i64::from(self.cfg.sensor_count) - 1);
        let reading = SensorReading {
            id: format!("read-{:08x}", self.rng.next_u32()),
            sensor_id: format!("sensor-{sensor:03}"),
            value: double_between(&mut self.rng, min, max),
            unit: self.cfg.unit.clone(),
            anomalous: self.anomalous,
            timestamp: at,
        };
        smallvec![Emission::now(EventPayload::SensorReading(reading))]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use datagen_core::variates::seeded_rng;

    #[test]
    fn badge_in_pairs_employee_with_stable_badge_id() {
        let cfg = TelemetryConfig::default();
        let mut generator = BadgeInGenerator::new(cfg.clone(), seeded_rng(71));
        for _ in 0..100 {
            let emissions = generator.produce(Utc::now());
            let EventPayload::BadgeIn(badge) = &emissions[0].record().payload else {
                panic!("expected a badge-in");
            };
            let idx = cfg
                .employees
                .iter()
                .position(|e| e == &badge.employee_name)
                .unwrap();
            assert_eq!(badge.badge_id, format!("emp-{idx:03}"));
            assert!(cfg.gates.contains(&badge.gate));
        }
    }

    #[test]
    fn regimes_keep_readings_in_their_ranges() {
        let cfg = TelemetryConfig::default();
        let mut normal = SensorReadingGenerator::normal(cfg.clone(), seeded_rng(73));
        let mut anomalous = SensorReadingGenerator::anomalous(cfg.clone(), seeded_rng(79));
        for _ in 0..100 {
            let EventPayload::SensorReading(reading) =
                normal.produce(Utc::now())[0].record().payload.clone()
            else {
                panic!("expected a sensor reading");
            };
            assert!(!reading.anomalous);
            assert!(reading.value >= cfg.normal_min && reading.value <= cfg.normal_max);

            let EventPayload::SensorReading(reading) =
                anomalous.produce(Utc::now())[0].record().payload.clone()
            else {
                panic!("expected a sensor reading");
            };
            assert!(reading.anomalous);
            assert!(reading.value >= cfg.anomalous_min && reading.value <= cfg.anomalous_max);
        }
    }

    #[test]
    fn anomalous_regime_is_much_rarer() {
        let cfg = TelemetryConfig::default();
        let normal = SensorReadingGenerator::normal(cfg.clone(), seeded_rng(83));
        let anomalous = SensorReadingGenerator::anomalous(cfg, seeded_rng(89));
        assert!(anomalous.interval() > normal.interval());
    }
}
