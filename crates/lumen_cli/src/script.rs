//! Slider simulation scripts
//!
//! A script is a list of steps separated by `;` or newlines:
//!
//! ```text
//! focus; key right; wait 800; drag -80; wait 100; prev; hover; wait 6000
//! ```

use anyhow::{anyhow, bail, Context, Result};
use lumen_platform::Key;

/// One scripted interaction
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Next,
    Prev,
    GoTo(usize),
    /// Advance the clock by this many milliseconds
    Wait(u64),
    /// Press, move horizontally by this much, release
    Drag(f32),
    Hover,
    Leave,
    Focus,
    Blur,
    Pause,
    Resume,
    Key(Key),
}

/// Parse a whole script
pub fn parse(script: &str) -> Result<Vec<Step>> {
    script
        .split([';', '\n'])
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .enumerate()
        .map(|(i, step)| parse_step(step).with_context(|| format!("step {}: '{}'", i + 1, step)))
        .collect()
}

fn parse_step(step: &str) -> Result<Step> {
    let mut words = step.split_whitespace();
    let command = words.next().unwrap_or_default().to_ascii_lowercase();
    let arg = words.next();

    if let Some(extra) = words.next() {
        bail!("unexpected argument '{}'", extra);
    }

    let step = match (command.as_str(), arg) {
        ("next", None) => Step::Next,
        ("prev", None) => Step::Prev,
        ("hover", None) => Step::Hover,
        ("leave", None) => Step::Leave,
        ("focus", None) => Step::Focus,
        ("blur", None) => Step::Blur,
        ("pause", None) => Step::Pause,
        ("resume", None) => Step::Resume,
        ("goto", Some(index)) => Step::GoTo(index.parse().context("expected a slide index")?),
        ("wait", Some(ms)) => Step::Wait(ms.parse().context("expected milliseconds")?),
        ("drag", Some(dx)) => Step::Drag(dx.parse().context("expected a horizontal distance")?),
        ("key", Some(key)) => Step::Key(parse_key(key)?),
        ("goto" | "wait" | "drag" | "key", None) => bail!("'{}' needs an argument", command),
        (_, Some(_)) if is_known(&command) => bail!("'{}' takes no argument", command),
        _ => return Err(anyhow!("unknown command '{}'", command)),
    };
    Ok(step)
}

fn is_known(command: &str) -> bool {
    matches!(
        command,
        "next" | "prev" | "hover" | "leave" | "focus" | "blur" | "pause" | "resume"
    )
}

fn parse_key(key: &str) -> Result<Key> {
    match key.to_ascii_lowercase().as_str() {
        "left" => Ok(Key::Left),
        "right" => Ok(Key::Right),
        "up" => Ok(Key::Up),
        "down" => Ok(Key::Down),
        other => bail!("unsupported key '{}' (left, right, up, down)", other),
    }
}
