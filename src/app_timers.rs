use crate::timer::Timer;

/// One timer per initialization stage plus the whole-step wrapper.
pub struct AppTimers {
    pub step: Timer,
    pub pa_to_cb: Timer,
    pub column_reset: Timer,
    pub rain_conversion: Timer,
    pub pbl_search: Timer,
    pub tracers: Timer,
}

impl AppTimers {
    pub fn new(total_num_steps: usize) -> Self {
        AppTimers {
            step: Timer::new("Total Step", total_num_steps),
            pa_to_cb: Timer::new("Pa To Cb", total_num_steps),
            column_reset: Timer::new("Column Reset", total_num_steps),
            rain_conversion: Timer::new("Rain Conversion", total_num_steps),
            pbl_search: Timer::new("PBL Search + Thermo", total_num_steps),
            tracers: Timer::new("Tracers", total_num_steps),
        }
    }

    fn regions(&self) -> [&Timer; 6] {
        [
            &self.step,
            &self.pa_to_cb,
            &self.column_reset,
            &self.rain_conversion,
            &self.pbl_search,
            &self.tracers,
        ]
    }

    pub fn generate_report(&self) -> String {
        let mut report = String::from(
            "\n\
             ----------------------------------------------------------------------\n\
             Region                        Count               Total        Average\n\
             ----------------------------------------------------------------------\n",
        );

        for timer in self.regions().iter() {
            let mean = timer
                .mean()
                .map(|value| format!("{:3.5?}", value))
                .unwrap_or_else(|| "-".to_owned());
            report.push_str(&format!(
                "{:<30}{:<10}{:>15}{:>15}\n",
                timer.region,
                timer.count(),
                format!("{:3.5?}", timer.total()),
                mean,
            ));
        }

        report
    }

    pub fn generate_timings_csv(&self) -> String {
        let mut rows = vec!["Region,Count,Total,Average".to_owned()];

        for timer in self.regions().iter() {
            let mean = timer
                .mean()
                .map(|value| format!("{:?}", value))
                .unwrap_or_default();
            rows.push(format!(
                "{},{},{:?},{}",
                timer.region,
                timer.count(),
                timer.total(),
                mean,
            ));
        }

        rows.join("\n")
    }
}
