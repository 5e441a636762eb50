//! Human-readable model report.

use std::io::Write;

use costpred_schemas::CategoryColumn;

use crate::CostPredictor;

impl CostPredictor {
    /// Writes the coefficients, category codes and fit statistics.
    pub fn write_report(&self, mut w: impl Write) -> std::io::Result<()> {
        let report = self.report();

        let intercept = self.model().intercept;
        writeln!(w, "Intercept:                 {intercept:.6}")?;
        for (name, coeff) in self.model().named_coefficients() {
            writeln!(w, "  {name:<24}{coeff:>16.6}")?;
        }

        writeln!(w)?;
        writeln!(w, "Training rows:             {}", report.train_rows)?;
        writeln!(w, "Held-out rows:             {}", report.test_rows)?;
        writeln!(w, "Shuffle seed:              {}", report.seed)?;
        let r2 = report.train_r_squared;
        writeln!(w, "R² (train):                {r2:.4}")?;
        if let (Some(r2), Some(rmse), Some(mae)) =
            (report.test_r_squared, report.test_rmse, report.test_mae)
        {
            writeln!(w, "R² (held-out):             {r2:.4}")?;
            writeln!(w, "RMSE (held-out):           {rmse:.4}")?;
            writeln!(w, "MAE (held-out):            {mae:.4}")?;
        }

        for column in [CategoryColumn::ActivityType, CategoryColumn::TimeOfDay]
        {
            writeln!(w, "\n{column} codes:")?;
            for (label, code) in self.mappings().for_column(column).iter() {
                writeln!(w, "  {code:>3}  {label}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{CostPredictor, PipelineConfig, TrainOptions, read_table};

    #[test]
    fn report_lists_codes_and_statistics() {
        let dataset = "\
Presupuesto,Tiempo invertido,Tipo,Momento,No. de personas,Costo
10,1,Ocio,Noche,1,20
20,2,Trabajo,Mañana,2,40
30,3,Ocio,Mañana,3,60
";
        let config = PipelineConfig {
            train: TrainOptions {
                test_fraction: 0.0,
                ..TrainOptions::default()
            },
            ..PipelineConfig::default()
        };
        let table = read_table(dataset.as_bytes(), &config.load).unwrap();
        let predictor = CostPredictor::from_table(&table, &config).unwrap();

        let mut out = Vec::new();
        predictor.write_report(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Intercept:"));
        assert!(text.contains("No. de personas"));
        assert!(text.contains("Training rows:             3"));
        assert!(!text.contains("held-out):"));
        assert!(text.contains("    1  Ocio"));
        assert!(text.contains("    2  Noche"));
    }
}
