use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::core::error::ToolError;
use crate::core::tool::{Tool, ToolName, ToolSpec};
use crate::domain::led::{is_hex_color, LED_DARK, RAINBOW};
use crate::domain::{LedMode, LedState};
use crate::infra::runtime::state::AgentState;
use crate::tools::args::{optional_str, required_str};

pub const RAINBOW_STEP: Duration = Duration::from_millis(500);

/// The running effect, if any. Every LED write happens under this lock, and
/// an effect task only writes while its generation is still current.
#[derive(Default)]
struct Effect {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Effect {
    /// Retire whatever is running and return the new generation.
    fn replace(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

fn lock(effect: &Mutex<Effect>) -> MutexGuard<'_, Effect> {
    effect.lock().unwrap_or_else(|e| e.into_inner())
}

/// Simulated RGB indicator. At most one effect task runs at a time.
#[derive(Clone)]
pub struct LedIndicator {
    state: AgentState,
    effect: Arc<Mutex<Effect>>,
    step: Duration,
}

impl LedIndicator {
    pub fn new(state: AgentState) -> Self {
        Self { state, effect: Arc::new(Mutex::new(Effect::default())), step: RAINBOW_STEP }
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    pub fn show_static(&self, color: &str) {
        let mut effect = lock(&self.effect);
        effect.replace();
        let mode = if color == LED_DARK { LedMode::Off } else { LedMode::Static(color.to_string()) };
        self.state.set_led(LedState { mode, color: color.to_string() });
        drop(effect);
        tracing::debug!(color = %color, "led static");
    }

    pub fn off(&self) {
        self.show_static(LED_DARK);
    }

    pub fn rainbow(&self) {
        let mut effect = lock(&self.effect);
        let generation = effect.replace();
        let state = self.state.clone();
        let shared = self.effect.clone();
        let step = self.step;
        effect.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(step);
            for color in RAINBOW.iter().cycle() {
                ticker.tick().await;
                let current = lock(&shared);
                if current.generation != generation {
                    break;
                }
                state.set_led(LedState { mode: LedMode::Rainbow, color: color.to_string() });
            }
        }));
        drop(effect);
        tracing::debug!("led rainbow");
    }
}

pub struct ControlLedTool {
    led: LedIndicator,
}

impl ControlLedTool {
    pub fn new(led: LedIndicator) -> Self {
        Self { led }
    }
}

impl ToolSpec for ControlLedTool {
    fn name(&self) -> ToolName {
        ToolName::ControlLed
    }
    fn description(&self) -> &'static str {
        "控制全彩LED"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "mode": {"type": "string", "enum": ["static", "rainbow", "off"]},
                "color": {"type": "string"}
            },
            "required": ["mode"]
        })
    }
}

#[async_trait]
impl Tool for ControlLedTool {
    async fn call(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        match required_str(args, "mode")? {
            "rainbow" => self.led.rainbow(),
            "off" => self.led.off(),
            "static" => {
                let color = optional_str(args, "color").unwrap_or(LED_DARK);
                if !is_hex_color(color) {
                    return Err(ToolError::InvalidArgument {
                        field: "color",
                        reason: "expected #RRGGBB".into(),
                    });
                }
                self.led.show_static(color);
            }
            other => {
                return Err(ToolError::InvalidArgument {
                    field: "mode",
                    reason: format!("unknown mode {other}"),
                })
            }
        }
        Ok("OK".into())
    }
}
