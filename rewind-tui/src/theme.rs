//! SynthBrute palette, plus the colors REWIND gives each step type and status.

use ratatui::style::Color;
use rewind_core::{StepType, X402Status};

/// One color per timeline stream.
#[derive(Debug, Clone, Copy)]
pub struct StepPalette {
    pub memory: Color,
    pub compliance: Color,
    pub x402: Color,
    pub tool_call: Color,
}

#[derive(Debug, Clone)]
pub struct SynthBruteTheme {
    pub bg_highlight: Color,
    pub primary: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
    pub steps: StepPalette,
}

const CYAN: Color = Color::Rgb(0, 255, 255);
const MAGENTA: Color = Color::Rgb(255, 0, 255);
const YELLOW: Color = Color::Rgb(255, 255, 0);
const GREEN: Color = Color::Rgb(0, 255, 0);
const RED: Color = Color::Rgb(255, 0, 0);

impl SynthBruteTheme {
    pub fn synthbrute() -> Self {
        Self {
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: CYAN,
            secondary: MAGENTA,
            tertiary: YELLOW,
            success: GREEN,
            warning: YELLOW,
            error: RED,
            info: CYAN,
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: CYAN,
            steps: StepPalette {
                memory: CYAN,
                compliance: YELLOW,
                x402: MAGENTA,
                tool_call: GREEN,
            },
        }
    }

    pub fn step_color(&self, step_type: StepType) -> Color {
        match step_type {
            StepType::Memory => self.steps.memory,
            StepType::Compliance => self.steps.compliance,
            StepType::X402 => self.steps.x402,
            StepType::ToolCall => self.steps.tool_call,
        }
    }

    pub fn x402_color(&self, status: X402Status) -> Color {
        match status {
            X402Status::Pending => self.warning,
            X402Status::Approved | X402Status::Completed => self.success,
            X402Status::Rejected => self.error,
            X402Status::Expired | X402Status::Unknown => self.text_dim,
        }
    }

    /// Compliance risk on a 0-100 scale: green below 40, yellow below 70.
    pub fn risk_color(&self, score: f64) -> Color {
        match score {
            s if s < 40.0 => self.success,
            s if s < 70.0 => self.warning,
            _ => self.error,
        }
    }
}
