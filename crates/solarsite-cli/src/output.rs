//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::{json, Value};
use solarsite_domain::{
    Arbitration, FieldResolution, FieldValue, MergedRecord, Resolution, SiteFields, SourceCollection,
    SourceRecord,
};
use solarsite_energy::{BatteryEstimate, DispatchPlan, PoaSeries, Qubo, RoiEstimate, ShadingEstimate};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an arbitration result, optionally with per-field provenance.
    pub fn format_arbitration(
        &self,
        arbitration: &Arbitration,
        sources: &[SourceRecord],
        explain: bool,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut output = json!({ "record": fields_json(arbitration.record.fields()) });
                if explain {
                    let resolutions: Vec<Value> = arbitration
                        .resolutions
                        .iter()
                        .map(|r| resolution_json(r, sources))
                        .collect();
                    output["resolutions"] = Value::Array(resolutions);
                }
                Ok(serde_json::to_string_pretty(&output)?)
            }
            OutputFormat::Table if explain => Ok(self.explain_table(arbitration, sources)),
            _ => self.format_merged(&arbitration.record),
        }
    }

    /// Format a merged record.
    pub fn format_merged(&self, record: &MergedRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&fields_json(record.fields()))?),
            OutputFormat::Quiet => Ok(quiet_fields(record.fields())),
            OutputFormat::Table => {
                if record.is_empty() {
                    return Ok(self.colorize("No fields resolved.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (field, value) in record.iter() {
                    builder.push_record([field.label().to_string(), value.to_string()]);
                }
                Ok(styled(builder))
            }
        }
    }

    /// Format the collected sources.
    pub fn format_sources(&self, sources: &SourceCollection) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let records: Vec<Value> = sources.iter().map(source_json).collect();
                Ok(serde_json::to_string_pretty(&records)?)
            }
            OutputFormat::Quiet => Ok(sources
                .iter()
                .map(|s| s.kind().as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if sources.is_empty() {
                    return Ok(self.colorize("No sources collected.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Kind", "Name", "Confidence", "Fields"]);
                for source in sources {
                    let fields: Vec<&str> = source.fields().iter().map(|(f, _)| f.as_str()).collect();
                    builder.push_record([
                        source.kind().to_string(),
                        source.name().to_string(),
                        source.confidence().to_string(),
                        fields.join(", "),
                    ]);
                }
                Ok(styled(builder))
            }
        }
    }

    /// Format a single source record.
    pub fn format_source(&self, source: &SourceRecord) -> Result<String> {
        match self.format {
            OutputFormat::Quiet => Ok(quiet_fields(source.fields())),
            _ => Ok(serde_json::to_string_pretty(&source_json(source))?),
        }
    }

    /// Format a shading estimate.
    pub fn format_shading(&self, estimate: &ShadingEstimate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "lat": estimate.lat,
                "lng": estimate.lng,
                "orientation": estimate.orientation.as_str(),
                "zoom": estimate.zoom,
                "bucket": estimate.bucket.as_str(),
                "multiplier": estimate.multiplier,
                "shading": estimate.shading,
            }))?),
            OutputFormat::Quiet => Ok(format!("{:.4}", estimate.shading)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Location", "Region", "Orientation", "Multiplier", "Shading"]);
                builder.push_record([
                    format!("{:.4}, {:.4}", estimate.lat, estimate.lng),
                    estimate.bucket.as_str().to_string(),
                    estimate.orientation.to_string(),
                    format!("{:.1}", estimate.multiplier),
                    format!("{:.1}%", estimate.shading * 100.0),
                ]);
                Ok(styled(builder))
            }
        }
    }

    /// Format a POA series.
    pub fn format_poa(&self, series: &PoaSeries, daily_only: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let output = if daily_only {
                    json!({ "daily": series.daily })
                } else {
                    json!({ "hourly": series.hourly, "daily": series.daily })
                };
                Ok(serde_json::to_string_pretty(&output)?)
            }
            OutputFormat::Quiet => Ok(format!("{:.3}", series.total_kwh())),
            OutputFormat::Table => {
                if series.daily.is_empty() {
                    return Ok(self.colorize("No irradiance data.", "yellow"));
                }
                let mut builder = Builder::default();
                if daily_only {
                    builder.push_record(["Date (UTC)", "POA kWh/m²"]);
                    for day in &series.daily {
                        builder.push_record([day.date.to_string(), format!("{:.3}", day.poa_kwh)]);
                    }
                } else {
                    builder.push_record(["Hour (UTC)", "POA W/m²"]);
                    for hour in &series.hourly {
                        builder.push_record([
                            hour.time.format("%Y-%m-%d %H:%M").to_string(),
                            format!("{:.1}", hour.poa_wm2),
                        ]);
                    }
                }
                let summary = format!("Total: {:.3} kWh/m² over {} day(s)", series.total_kwh(), series.daily.len());
                Ok(format!("{}\n{}", styled(builder), self.info(&summary)))
            }
        }
    }

    /// Format a solar return estimate.
    pub fn format_roi(&self, estimate: &RoiEstimate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(estimate)?),
            OutputFormat::Quiet => Ok(format!("{:.2}", estimate.p50)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["System kW", "Savings p50 (AUD/yr)", "Savings p90 (AUD/yr)", "Model"]);
                builder.push_record([
                    format!("{:.1}", estimate.system_size_kw),
                    format!("{:.2}", estimate.p50),
                    format!("{:.2}", estimate.p90),
                    format!("{} {}", estimate.source_model, estimate.version),
                ]);
                Ok(styled(builder))
            }
        }
    }

    /// Format a battery return estimate.
    pub fn format_battery(&self, estimate: &BatteryEstimate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(estimate)?),
            OutputFormat::Quiet => Ok(format!("{:.2}", estimate.p50)),
            OutputFormat::Table => {
                let mut summary = Builder::default();
                summary.push_record(["Capacity kWh", "Savings p50 (AUD/yr)", "Savings p90 (AUD/yr)", "Payback (yr)"]);
                summary.push_record([
                    format!("{:.1}", estimate.capacity_kwh),
                    format!("{:.2}", estimate.p50),
                    format!("{:.2}", estimate.p90),
                    format!("{:.1}", estimate.payback_years),
                ]);
                let cost = estimate
                    .dispatch_cost
                    .map(|cost| format!("\nPlanned grid cost: {:.2}", cost))
                    .unwrap_or_default();

                let mut schedule = Builder::default();
                schedule.push_record(["Hour", "Charge kW", "Discharge kW"]);
                for slot in estimate
                    .cycle_schedule
                    .iter()
                    .filter(|s| s.charge_kw > 0.0 || s.discharge_kw > 0.0)
                {
                    schedule.push_record([
                        format!("{:02}:00", slot.hour),
                        format!("{:.1}", slot.charge_kw),
                        format!("{:.1}", slot.discharge_kw),
                    ]);
                }
                Ok(format!("{}\n{}{}", styled(summary), styled(schedule), cost))
            }
        }
    }

    /// Format a dispatch plan against the idle-battery cost.
    pub fn format_dispatch(&self, plan: &DispatchPlan, idle_cost: f64) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut output = serde_json::to_value(plan)?;
                output["idle_cost"] = json!(idle_cost);
                Ok(serde_json::to_string_pretty(&output)?)
            }
            OutputFormat::Quiet => Ok(format!("{:.4}", plan.cost)),
            OutputFormat::Table => {
                if plan.schedule.is_empty() {
                    return Ok(self.colorize("No hours to plan.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Hour", "SoC", "Charge kW", "Discharge kW", "Import kW", "Export kW"]);
                for (step, soc) in plan.schedule.iter().zip(&plan.soc_series) {
                    builder.push_record([
                        step.hour.to_string(),
                        format!("{:.3}", soc),
                        format!("{:.3}", step.charge_kw),
                        format!("{:.3}", step.discharge_kw),
                        format!("{:.3}", step.import_kw),
                        format!("{:.3}", step.export_kw),
                    ]);
                }
                Ok(format!(
                    "{}\nCost: {:.4} (idle battery: {:.4})",
                    styled(builder),
                    plan.cost,
                    idle_cost
                ))
            }
        }
    }

    /// Format QUBO coefficients.
    pub fn format_qubo(&self, qubo: &Qubo) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(qubo)?),
            OutputFormat::Quiet => Ok(qubo.len().to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Row", "Column", "Coefficient"]);
                for term in qubo.terms() {
                    builder.push_record([
                        term.row.to_string(),
                        term.col.to_string(),
                        format!("{:.4}", term.coefficient),
                    ]);
                }
                Ok(styled(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn explain_table(&self, arbitration: &Arbitration, sources: &[SourceRecord]) -> String {
        if arbitration.resolutions.is_empty() {
            return self.colorize("No fields resolved.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value", "Source", "Rule", "Candidates"]);
        for resolution in &arbitration.resolutions {
            let value = arbitration
                .record
                .get(resolution.field)
                .map(|v| v.to_string())
                .unwrap_or_default();
            let source = sources
                .get(resolution.source_index)
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| resolution.kind.to_string());
            let candidates = if resolution.agreed {
                resolution.candidate_count.to_string()
            } else {
                self.colorize(&format!("{} (conflict)", resolution.candidate_count), "yellow")
            };
            builder.push_record([
                resolution.field.label().to_string(),
                value,
                source,
                rule_label(&resolution.resolution),
                candidates,
            ]);
        }
        styled(builder)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn rule_label(resolution: &Resolution) -> String {
    match resolution {
        Resolution::KindPriority { rank, kind } => format!("{} prefers {} (rank {})", resolution.as_str(), kind, rank),
        other => other.as_str().to_string(),
    }
}

fn field_value_json(value: FieldValue<'_>) -> Value {
    match value {
        FieldValue::Text(s) => json!(s),
        FieldValue::Number(n) => json!(n),
    }
}

fn fields_json(fields: &SiteFields) -> Value {
    let map: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(field, value)| (field.as_str().to_string(), field_value_json(value)))
        .collect();
    Value::Object(map)
}

fn quiet_fields(fields: &SiteFields) -> String {
    fields
        .iter()
        .map(|(field, value)| format!("{}={}", field.as_str(), value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn source_json(source: &SourceRecord) -> Value {
    json!({
        "id": source.id().to_string(),
        "name": source.name(),
        "kind": source.kind().as_str(),
        "confidence": source.confidence().value(),
        "observedAt": source.observed_at(),
        "fields": fields_json(source.fields()),
    })
}

fn resolution_json(resolution: &FieldResolution, sources: &[SourceRecord]) -> Value {
    let mut output = json!({
        "field": resolution.field.as_str(),
        "kind": resolution.kind.as_str(),
        "sourceIndex": resolution.source_index,
        "sourceId": resolution.source_id.to_string(),
        "resolution": resolution.resolution.as_str(),
        "candidates": resolution.candidate_count,
        "agreed": resolution.agreed,
        "maxConfidence": resolution.max_confidence.value(),
    });
    if let Resolution::KindPriority { rank, .. } = resolution.resolution {
        output["rank"] = json!(rank);
    }
    if let Some(source) = sources.get(resolution.source_index) {
        output["sourceName"] = json!(source.name());
    }
    output
}
