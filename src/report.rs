use crate::evaluate::{Dimension, Evaluation, Measurement};

/// Report returned when the uploaded video cannot be opened.
pub const UNREADABLE: &str = "Error: Cannot open video.";

fn measurement_line(dimension: Dimension, value: f64) -> String {
    match dimension {
        Dimension::ShoulderRotation => format!("\n🧍 Shoulder Rotation Range: {:.2}°", value),
        Dimension::WristArc => format!("\n🖐 Wrist Arc Vertical Range: {:.3}", value),
        Dimension::ShoulderBalance => {
            format!("\n📋 Shoulder Plane Balance: {:.3} (L-R deviation)", value)
        }
    }
}

fn untracked_line(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::ShoulderRotation => "❌ Could not track shoulders.",
        Dimension::WristArc => "❌ Could not track wrists.",
        Dimension::ShoulderBalance => "❌ Could not track shoulder balance.",
    }
}

/// Render the coaching report. `club` is shown upper-cased in the header.
pub fn render(club: &str, evaluation: &Evaluation) -> String {
    let mut report = format!("📊 SWING ANALYSIS REPORT ({})\n", club.to_uppercase());

    match evaluation {
        Evaluation::Putting { tips } => {
            report.push_str("\n🧘 Putter Stroke Analysis:\n");
            for tip in tips {
                report.push_str(&format!("  💡 {}\n", tip));
            }
        }
        Evaluation::Swing { measurements } => {
            for measurement in measurements {
                match *measurement {
                    Measurement::Tracked {
                        dimension, value, ..
                    } => report.push_str(&measurement_line(dimension, value)),
                    Measurement::Untracked(dimension) => report.push_str(untracked_line(dimension)),
                }
                report.push('\n');
            }

            report.push_str("\n🎯 Final Coaching Insights (Tailored):\n");
            for finding in evaluation.findings() {
                let dimension = finding.dimension;
                let line = match finding.advice {
                    Some(tip) => format!("  ❌ {}: {}\n", dimension.fault_label(), tip),
                    None => format!(
                        "  ✅ {}: Great job, keep doing this!\n",
                        dimension.pass_label()
                    ),
                };
                report.push_str(&line);
            }
        }
    }

    report
}
