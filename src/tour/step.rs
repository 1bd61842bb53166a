use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Top,
    Right,
    Bottom,
    Left,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

impl FromStr for Position {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            other => Err(AppError::invalid_argument(format!(
                "unknown step position: {other}"
            ))),
        }
    }
}

fn lenient_position<'de, D>(deserializer: D) -> Result<Option<Position>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.parse::<Position>() {
        Ok(position) => Some(position),
        Err(err) => {
            tracing::debug!(%err, "falling back to default anchor");
            None
        }
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProceedSignal {
    pub(crate) token: u64,
}

/// One-shot callback handed to a hook of a step with
/// `pause_tour_till_update`. The transition completes only once `resume` is
/// called; a handle outliving its transition is ignored.
#[derive(Debug)]
pub struct Proceed {
    token: u64,
    tx: UnboundedSender<ProceedSignal>,
}

impl Proceed {
    pub(crate) fn new(token: u64, tx: UnboundedSender<ProceedSignal>) -> Self {
        Self { token, tx }
    }

    pub fn resume(self) {
        let _ = self.tx.send(ProceedSignal { token: self.token });
    }
}

type HookFn = dyn Fn(Option<Proceed>) -> AppResult<()> + Send + Sync;

/// Side-effecting step hook. Receives `Some(proceed)` only for steps that
/// pause the tour until the host has updated.
#[derive(Clone)]
pub struct StepHook(Arc<HookFn>);

impl StepHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(Option<Proceed>) -> AppResult<()> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(&self, proceed: Option<Proceed>) -> AppResult<()> {
        (self.0)(proceed)
    }
}

impl fmt::Debug for StepHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepHook(..)")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub alternate_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: Option<Position>,
    #[serde(default)]
    pub scroll_to_view: bool,
    /// 1-based step to land on when navigating backward from this step.
    #[serde(default)]
    pub prev_step: Option<usize>,
    #[serde(default)]
    pub pause_tour_till_update: bool,
    #[serde(skip)]
    pub on_next: Option<StepHook>,
    #[serde(skip)]
    pub on_prev: Option<StepHook>,
}

impl Step {
    pub fn new(id: impl Into<String>, title: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            desc: desc.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn alternate_id(mut self, id: impl Into<String>) -> Self {
        self.alternate_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn scroll_to_view(mut self, scroll: bool) -> Self {
        self.scroll_to_view = scroll;
        self
    }

    #[must_use]
    pub fn prev_step(mut self, step: usize) -> Self {
        self.prev_step = Some(step);
        self
    }

    #[must_use]
    pub fn pause_till_update(mut self, pause: bool) -> Self {
        self.pause_tour_till_update = pause;
        self
    }

    #[must_use]
    pub fn on_next<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Proceed>) -> AppResult<()> + Send + Sync + 'static,
    {
        self.on_next = Some(StepHook::new(hook));
        self
    }

    #[must_use]
    pub fn on_prev<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Proceed>) -> AppResult<()> + Send + Sync + 'static,
    {
        self.on_prev = Some(StepHook::new(hook));
        self
    }
}

#[derive(Debug, Deserialize)]
struct TourFile {
    #[serde(default)]
    steps: Vec<Step>,
}

/// Parses `[[steps]]` tables. Hooks cannot be expressed in TOML and are
/// attached by the host afterwards.
pub fn parse_steps(raw: &str) -> AppResult<Vec<Step>> {
    parse_tour(raw, "<inline>")
}

pub fn load_steps(path: impl AsRef<Path>) -> AppResult<Vec<Step>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| {
        AppError::io_with_context(source, format!("failed to read tour: {}", path.display()))
    })?;
    parse_tour(&raw, &path.display().to_string())
}

fn parse_tour(raw: &str, origin: &str) -> AppResult<Vec<Step>> {
    let file = toml::from_str::<TourFile>(raw)
        .map_err(|source| AppError::tour_file(origin, source.to_string()))?;
    if let Some(index) = file.steps.iter().position(|step| step.id.trim().is_empty()) {
        return Err(AppError::tour_file(
            origin,
            format!("step {} has an empty id", index + 1),
        ));
    }
    Ok(file.steps)
}
