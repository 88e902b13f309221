// Combined heat and power plant model, advanced in hourly steps
use super::measurement::{Measurement, METRICS};
use super::settings::{SettingsPayload, SettingsUpdate, HOURS_PER_DAY};
use rand::Rng;

pub const GAS_PRICE_PER_KWH: f64 = 0.0655;

/// Workload ceiling of both generators, in percent
const MAX_WORKLOAD: f64 = 99.0;

/// The peak load boiler joins this many hours after start
pub const PLB_START_HOUR: u64 = 10;

const DEFAULT_DAILY_DEMAND: [f64; HOURS_PER_DAY] = [
    0.2, 0.15, 0.1, 0.1, 0.1, 0.2, 0.45, 0.8, 0.9, 0.7, 0.6, 0.55, 0.6, 0.55, 0.5, 0.5, 0.55, 0.7,
    0.85, 0.9, 0.8, 0.6, 0.4, 0.3,
];

#[derive(Debug, Clone)]
pub struct HeatStorage {
    pub capacity: f64,
    pub target_energy: f64,
    pub undersupplied_threshold: f64,
    input_energy: f64,
    output_energy: f64,
}

impl Default for HeatStorage {
    fn default() -> Self {
        let target_energy = 500.0;
        Self {
            capacity: 700.0,
            target_energy,
            undersupplied_threshold: target_energy / 2.0,
            input_energy: 0.0,
            output_energy: 0.0,
        }
    }
}

impl HeatStorage {
    pub fn energy_stored(&self) -> f64 {
        self.input_energy - self.output_energy
    }

    /// Fill level in percent of capacity
    pub fn level(&self) -> f64 {
        self.energy_stored() / self.capacity * MAX_WORKLOAD
    }

    /// Energy that would overflow the capacity is discarded
    pub fn add_energy(&mut self, energy: f64) {
        if self.energy_stored() + energy <= self.capacity {
            self.input_energy += energy;
        }
    }

    pub fn consume_energy(&mut self, energy: f64) -> bool {
        if self.energy_stored() - energy >= 0.0 {
            self.output_energy += energy;
            true
        } else {
            tracing::debug!("Heat storage empty, {:.2} kWh not delivered", energy);
            false
        }
    }

    pub fn undersupplied(&self) -> bool {
        self.energy_stored() < self.undersupplied_threshold
    }
}

#[derive(Debug, Clone)]
pub struct CogenerationUnit {
    pub max_gas_input: f64,
    pub electrical_efficiency: f64,
    pub thermal_efficiency: f64,
    pub minimal_workload: f64,
    pub noise: bool,
    pub workload: f64,
    pub current_gas_consumption: f64,
    pub current_electrical_production: f64,
    pub current_thermal_production: f64,
    pub total_gas_consumption: f64,
    pub total_electrical_production: f64,
    pub total_thermal_production: f64,
}

impl Default for CogenerationUnit {
    fn default() -> Self {
        Self {
            max_gas_input: 49.0,
            electrical_efficiency: 0.3,
            thermal_efficiency: 0.62,
            minimal_workload: 40.0,
            noise: true,
            workload: 0.0,
            current_gas_consumption: 0.0,
            current_electrical_production: 0.0,
            current_thermal_production: 0.0,
            total_gas_consumption: 0.0,
            total_electrical_production: 0.0,
            total_thermal_production: 0.0,
        }
    }
}

impl CogenerationUnit {
    pub fn calculate_workload<R: Rng>(&mut self, storage: &HeatStorage, rng: &mut R) {
        let mut workload =
            storage.target_energy + self.minimal_workload - storage.energy_stored();
        if self.noise {
            workload += rng.gen_range(-0.5..0.5);
        }

        self.workload = if workload >= self.minimal_workload {
            workload.min(MAX_WORKLOAD)
        } else {
            0.0
        };

        self.current_gas_consumption = self.workload / MAX_WORKLOAD * self.max_gas_input;
        self.current_electrical_production =
            self.current_gas_consumption * self.electrical_efficiency;
        self.current_thermal_production = self.current_gas_consumption * self.thermal_efficiency;
    }

    pub fn operating_costs(&self) -> f64 {
        self.total_gas_consumption * GAS_PRICE_PER_KWH
    }

    pub fn step<R: Rng>(&mut self, storage: &mut HeatStorage, rng: &mut R) {
        self.calculate_workload(storage, rng);
        storage.add_energy(self.current_thermal_production);
        self.total_gas_consumption += self.current_gas_consumption;
        self.total_electrical_production += self.current_electrical_production;
        self.total_thermal_production += self.current_thermal_production;

        tracing::debug!(
            "CU workload: {:.2} % Total: {:.2} kWh ({:.2} Euro)",
            self.workload,
            self.total_gas_consumption,
            self.operating_costs()
        );
    }
}

#[derive(Debug, Clone)]
pub struct PeakLoadBoiler {
    pub max_gas_input: f64,
    pub thermal_efficiency: f64,
    pub workload: f64,
    pub current_gas_consumption: f64,
    pub current_thermal_production: f64,
    pub total_gas_consumption: f64,
    pub total_thermal_production: f64,
}

impl Default for PeakLoadBoiler {
    fn default() -> Self {
        Self {
            max_gas_input: 100.0,
            thermal_efficiency: 0.8,
            workload: 0.0,
            current_gas_consumption: 0.0,
            current_thermal_production: 0.0,
            total_gas_consumption: 0.0,
            total_thermal_production: 0.0,
        }
    }
}

impl PeakLoadBoiler {
    /// Switches fully on when the storage runs low and off once the target is
    /// reachable; otherwise the previous workload is kept.
    pub fn calculate_workload(&mut self, storage: &HeatStorage) {
        if storage.undersupplied() {
            self.workload = MAX_WORKLOAD;
        } else if storage.energy_stored() + self.current_thermal_production
            >= storage.target_energy
        {
            self.workload = 0.0;
        }

        self.current_gas_consumption = self.workload / MAX_WORKLOAD * self.max_gas_input;
        self.current_thermal_production = self.current_gas_consumption * self.thermal_efficiency;
    }

    pub fn operating_costs(&self) -> f64 {
        self.total_gas_consumption * GAS_PRICE_PER_KWH
    }

    pub fn step(&mut self, storage: &mut HeatStorage) {
        self.calculate_workload(storage);
        storage.add_energy(self.current_thermal_production);
        self.total_gas_consumption += self.current_gas_consumption;
        self.total_thermal_production += self.current_thermal_production;

        tracing::debug!(
            "PLB workload: {:.2} % Total: {:.2} kWh ({:.2} Euro)",
            self.workload,
            self.total_gas_consumption,
            self.operating_costs()
        );
    }
}

#[derive(Debug, Clone)]
pub struct ThermalConsumer {
    pub base_demand: f64,
    pub varying_demand: f64,
    pub noise: bool,
    pub daily_demand: Vec<f64>,
    consumption: f64,
}

impl Default for ThermalConsumer {
    fn default() -> Self {
        Self {
            base_demand: 20.0,
            varying_demand: 30.0,
            noise: true,
            daily_demand: DEFAULT_DAILY_DEMAND.to_vec(),
            consumption: 0.0,
        }
    }
}

impl ThermalConsumer {
    /// Consumption of the last step, in kW
    pub fn consumption(&self) -> f64 {
        self.consumption
    }

    pub fn demand_at<R: Rng>(&self, hour_of_day: usize, rng: &mut R) -> f64 {
        let factor = self
            .daily_demand
            .get(hour_of_day % HOURS_PER_DAY)
            .copied()
            .unwrap_or(0.0);
        let mut demand = self.base_demand + self.varying_demand * factor;
        if self.noise {
            demand += rng.gen_range(-1.0..1.0);
        }
        demand.max(0.0)
    }

    pub fn step<R: Rng>(&mut self, storage: &mut HeatStorage, hour_of_day: usize, rng: &mut R) {
        self.consumption = self.demand_at(hour_of_day, rng);
        storage.consume_energy(self.consumption);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Plant {
    pub heat_storage: HeatStorage,
    pub cu: CogenerationUnit,
    pub plb: PeakLoadBoiler,
    pub thermal: ThermalConsumer,
    hours_elapsed: u64,
}

impl Plant {
    pub fn hours_elapsed(&self) -> u64 {
        self.hours_elapsed
    }

    pub fn plb_running(&self) -> bool {
        self.hours_elapsed >= PLB_START_HOUR
    }

    /// Advance the plant by one hour: consumer, CU, then PLB once started
    pub fn step<R: Rng>(&mut self, hour_of_day: usize, rng: &mut R) {
        self.thermal.step(&mut self.heat_storage, hour_of_day, rng);
        self.cu.step(&mut self.heat_storage, rng);
        if self.plb_running() {
            if self.hours_elapsed == PLB_START_HOUR {
                tracing::info!("Starting peak load boiler");
            }
            self.plb.step(&mut self.heat_storage);
        }
        self.hours_elapsed += 1;
    }

    pub fn measure(&self, time: i64) -> Measurement {
        let mut values = [0.0; METRICS.len()];
        for (idx, (key, _)) in METRICS.iter().enumerate() {
            values[idx] = match *key {
                "cu_workload" => self.cu.workload,
                "cu_electrical_power" => self.cu.current_electrical_production,
                "cu_thermal_power" => self.cu.current_thermal_production,
                "cu_total_gas_consumption" => self.cu.total_gas_consumption,
                "plb_workload" => self.plb.workload,
                "plb_thermal_power" => self.plb.current_thermal_production,
                "plb_total_gas_consumption" => self.plb.total_gas_consumption,
                "hs_level" => self.heat_storage.level(),
                "thermal_consumption" => self.thermal.consumption(),
                _ => 0.0,
            };
        }
        Measurement::new(time, values)
    }

    pub fn settings(&self) -> SettingsPayload {
        SettingsPayload {
            average_thermal_demand: self.thermal.base_demand,
            varying_thermal_demand: self.thermal.varying_demand,
            thermal_demand_noise: self.thermal.noise as u8,
            hs_capacity: self.heat_storage.capacity,
            hs_target_energy: self.heat_storage.target_energy,
            hs_undersupplied_threshold: self.heat_storage.undersupplied_threshold,
            cu_max_gas_input: self.cu.max_gas_input,
            cu_minimal_workload: self.cu.minimal_workload,
            cu_noise: self.cu.noise as u8,
            plb_max_gas_input: self.plb.max_gas_input,
            sim_forward: String::new(),
            daily_thermal_demand: self.thermal.daily_demand.clone(),
        }
    }

    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(v) = update.average_thermal_demand {
            self.thermal.base_demand = v;
        }
        if let Some(v) = update.varying_thermal_demand {
            self.thermal.varying_demand = v;
        }
        if let Some(v) = update.thermal_demand_noise {
            self.thermal.noise = v;
        }
        if let Some(v) = update.hs_capacity {
            self.heat_storage.capacity = v;
        }
        if let Some(v) = update.hs_target_energy {
            self.heat_storage.target_energy = v;
        }
        if let Some(v) = update.hs_undersupplied_threshold {
            self.heat_storage.undersupplied_threshold = v;
        }
        if let Some(v) = update.cu_max_gas_input {
            self.cu.max_gas_input = v;
        }
        if let Some(v) = update.cu_minimal_workload {
            self.cu.minimal_workload = v;
        }
        if let Some(v) = update.cu_noise {
            self.cu.noise = v;
        }
        if let Some(v) = update.plb_max_gas_input {
            self.plb.max_gas_input = v;
        }
        if let Some(daily) = &update.daily_thermal_demand {
            self.thermal.daily_demand = daily.clone();
        }
    }
}
