use std::path::PathBuf;

use anyhow::Result;
use chainform_spec::value::field_value;
use chainform_spec::{
    BarrierState, CascadeController, CascadeOutcome, Effect, EffectLog, FieldId, FieldSet,
};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(value_name = "fields.json")]
    pub fields: PathBuf,
    /// Steps as `[{"op": "change", "field_id": 1, "value": "yes"}, {"op": "settle"}]`
    #[arg(value_name = "script.json")]
    pub script: PathBuf,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

/// One scripted browser event.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Register {
        field_id: FieldId,
    },
    Change {
        field_id: FieldId,
        #[serde(default)]
        value: JsonValue,
    },
    Settle,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Script {
    Steps(Vec<Step>),
    Wrapped { steps: Vec<Step> },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub state: BarrierState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<CascadeOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSnapshot {
    pub id: FieldId,
    pub hidden: bool,
    pub required: bool,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    /// Evaluations still queued after the last step; the event loop would
    /// flush them, so the report does too.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_settle: Option<StepReport>,
    pub fields: Vec<FieldSnapshot>,
}

pub fn run(args: &ReplayArgs, config: &Config) -> Result<ReplayReport> {
    let fields = super::load_fields(&args.fields)?;
    let steps = match super::read_json::<Script>(&args.script)? {
        Script::Steps(steps) | Script::Wrapped { steps } => steps,
    };
    let report = replay(fields, steps, config);
    info!(
        steps = report.steps.len(),
        hidden = report.fields.iter().filter(|field| field.hidden).count(),
        "replay finished"
    );
    Ok(report)
}

pub fn replay(fields: FieldSet, steps: Vec<Step>, config: &Config) -> ReplayReport {
    let mut controller = CascadeController::new(fields)
        .with_null_matching(config.null_matching)
        .with_enabled(config.enabled);
    let mut log = EffectLog::default();

    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.into_iter().enumerate() {
        let (state, mismatch, outcomes) = match &step {
            Step::Register { field_id } => match controller.register(*field_id) {
                Ok(state) => (state, None, Vec::new()),
                Err(mismatch) => (controller.state(), Some(mismatch), Vec::new()),
            },
            Step::Change { field_id, value } => {
                match controller.change_value(*field_id, field_value(value)) {
                    Ok(state) => (state, None, Vec::new()),
                    Err(mismatch) => (controller.state(), Some(mismatch), Vec::new()),
                }
            }
            Step::Settle => {
                let outcomes = controller.settle(&mut log);
                (controller.state(), None, outcomes)
            }
        };
        if let Some(mismatch) = &mismatch {
            warn!(index, %mismatch, "step not applied");
        }
        reports.push(StepReport {
            index,
            step,
            state,
            mismatch: mismatch.map(|mismatch| mismatch.to_string()),
            effects: log.take(),
            outcomes,
        });
    }

    let final_settle = (controller.pending_count() > 0
        && controller.state() == BarrierState::Ready)
        .then(|| {
            let outcomes = controller.settle(&mut log);
            StepReport {
                index: reports.len(),
                step: Step::Settle,
                state: controller.state(),
                mismatch: None,
                effects: log.take(),
                outcomes,
            }
        });

    let fields = controller
        .fields()
        .iter()
        .map(|field| FieldSnapshot {
            id: field.id,
            hidden: controller.is_hidden(field.id),
            required: field.required,
            value: field.current_value.clone(),
        })
        .collect();

    ReplayReport {
        steps: reports,
        final_settle,
        fields,
    }
}

fn describe_step(step: &Step) -> String {
    match step {
        Step::Register { field_id } => format!("register {field_id}"),
        Step::Change { field_id, value } => format!("change {field_id} = {value}"),
        Step::Settle => "settle".to_string(),
    }
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::Show { field_id } => format!("show {field_id}"),
        Effect::Hide { field_id } => format!("hide {field_id}"),
        Effect::Clear { field_id, kind } => format!("clear {field_id} ({kind:?})"),
    }
}

fn render_step(report: &StepReport, lines: &mut Vec<String>) {
    let state = match report.state {
        BarrierState::Registering => "registering",
        BarrierState::Ready => "ready",
    };
    lines.push(format!(
        "#{} {} [{state}]",
        report.index,
        describe_step(&report.step)
    ));
    if let Some(mismatch) = &report.mismatch {
        lines.push(format!("  ignored: {mismatch}"));
    }
    for effect in &report.effects {
        lines.push(format!("  {}", describe_effect(effect)));
    }
}

pub fn render(report: &ReplayReport) -> String {
    let mut lines = Vec::new();
    for step in &report.steps {
        render_step(step, &mut lines);
    }
    if let Some(step) = &report.final_settle {
        render_step(step, &mut lines);
    }
    let hidden = report
        .fields
        .iter()
        .filter(|field| field.hidden)
        .map(|field| field.id.to_string())
        .collect::<Vec<_>>();
    if hidden.is_empty() {
        lines.push("hidden: none".to_string());
    } else {
        lines.push(format!("hidden: {}", hidden.join(", ")));
    }
    lines.join("\n")
}

pub fn emit(report: &ReplayReport, json: bool) -> Result<()> {
    if json {
        return super::print_json(report);
    }
    println!("{}", render(report));
    Ok(())
}
