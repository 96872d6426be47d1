//! Parameter validation
//!
//! Pure range checks mirroring the limits the device enforces. Each rule
//! returns a [`CommandOutcome`]: success carries the `ok` sentinel, failure
//! names the violated constraint and its bounds. Composite rules report every
//! violation, one per line, instead of stopping at the first.

use crate::commands::DroneCommand;
use crate::limits::*;
use crate::{response, CommandOutcome};

/// Identifies which rule guards a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// Linear moves: up/down/left/right/forward/back
    Distance,
    /// Rotations: cw/ccw
    Degrees,
    /// `speed {n}`
    Speed,
    /// `go {x} {y} {z} {speed}`
    Go,
    /// `curve {x1} {y1} {z1} {x2} {y2} {z2} {speed}`
    Curve,
}

/// Message when every coordinate of a point sits on the lower bound
pub const DEGENERATE_VECTOR: &str = "x, y and z values can’t be set equal to 20 simultaneously";

fn in_range(value: i32, lo: i32, hi: i32) -> bool {
    (lo..=hi).contains(&value)
}

fn range_check(value: i32, lo: i32, hi: i32, label: &str) -> CommandOutcome {
    if in_range(value, lo, hi) {
        CommandOutcome::success(response::OK)
    } else {
        CommandOutcome::failure(format!("{} must be between {} and {}", label, lo, hi))
    }
}

fn is_degenerate(x: i32, y: i32, z: i32) -> bool {
    x == COORDINATE_MIN && y == COORDINATE_MIN && z == COORDINATE_MIN
}

fn collect(violations: Vec<String>) -> CommandOutcome {
    if violations.is_empty() {
        CommandOutcome::success(response::OK)
    } else {
        CommandOutcome::failure(violations.join("\n"))
    }
}

fn axis_message(axis: &str) -> String {
    format!(
        "{} Dimension must be between {} and {}",
        axis, COORDINATE_MIN, COORDINATE_MAX
    )
}

/// Linear move distance in cm
pub fn distance(distance: i32) -> CommandOutcome {
    range_check(distance, DISTANCE_MIN, DISTANCE_MAX, "Distance")
}

/// Rotation in degrees
pub fn degrees(degrees: i32) -> CommandOutcome {
    range_check(degrees, DEGREES_MIN, DEGREES_MAX, "Degrees")
}

/// Speed setting in cm/s
pub fn speed(speed: i32) -> CommandOutcome {
    range_check(speed, SPEED_MIN, SPEED_MAX, "Speed")
}

/// Fly to a relative point at `speed`
pub fn go(x: i32, y: i32, z: i32, speed: i32) -> CommandOutcome {
    let mut violations = Vec::new();

    for (axis, value) in [("X", x), ("Y", y), ("Z", z)] {
        if !in_range(value, COORDINATE_MIN, COORDINATE_MAX) {
            violations.push(axis_message(axis));
        }
    }

    if !in_range(speed, SPEED_MIN, SPEED_MAX) {
        violations.push(format!("Speed must be between {} and {}", SPEED_MIN, SPEED_MAX));
    }

    if is_degenerate(x, y, z) {
        violations.push(DEGENERATE_VECTOR.to_string());
    }

    collect(violations)
}

/// Fly a curve through two relative points at `speed`
///
/// One line per axis covers both points.
#[allow(clippy::too_many_arguments)]
pub fn curve(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32, speed: i32) -> CommandOutcome {
    let mut violations = Vec::new();

    for (axis, first, second) in [("X", x1, x2), ("Y", y1, y2), ("Z", z1, z2)] {
        if !in_range(first, COORDINATE_MIN, COORDINATE_MAX)
            || !in_range(second, COORDINATE_MIN, COORDINATE_MAX)
        {
            violations.push(axis_message(axis));
        }
    }

    if !in_range(speed, SPEED_MIN, CURVE_SPEED_MAX) {
        violations.push(format!(
            "Speed must be between {} and {}",
            SPEED_MIN, CURVE_SPEED_MAX
        ));
    }

    if is_degenerate(x1, y1, z1) || is_degenerate(x2, y2, z2) {
        violations.push(DEGENERATE_VECTOR.to_string());
    }

    collect(violations)
}

impl ValidationRule {
    /// Apply this rule to the parameters captured in `command`
    ///
    /// A command whose shape does not belong to the rule passes.
    pub fn apply(&self, command: &DroneCommand) -> CommandOutcome {
        match (self, command) {
            (
                ValidationRule::Distance,
                DroneCommand::Up(n)
                | DroneCommand::Down(n)
                | DroneCommand::Left(n)
                | DroneCommand::Right(n)
                | DroneCommand::Forward(n)
                | DroneCommand::Back(n),
            ) => distance(*n),
            (
                ValidationRule::Degrees,
                DroneCommand::Clockwise(n) | DroneCommand::CounterClockwise(n),
            ) => degrees(*n),
            (ValidationRule::Speed, DroneCommand::Speed(n)) => speed(*n),
            (ValidationRule::Go, DroneCommand::Go { x, y, z, speed }) => go(*x, *y, *z, *speed),
            (
                ValidationRule::Curve,
                DroneCommand::Curve {
                    x1,
                    y1,
                    z1,
                    x2,
                    y2,
                    z2,
                    speed,
                },
            ) => curve(*x1, *y1, *z1, *x2, *y2, *z2, *speed),
            _ => CommandOutcome::success(response::OK),
        }
    }
}

/// Validate a command with its own rule; unguarded commands always pass
pub fn check(command: &DroneCommand) -> CommandOutcome {
    match command.validation_rule() {
        Some(rule) => rule.apply(command),
        None => CommandOutcome::success(response::OK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTANCE_MESSAGE: &str = "Distance must be between 20 and 500";

    #[test]
    fn test_distance_boundaries() {
        for value in [20, 100, 500] {
            let result = distance(value);
            assert!(result.succeeded(), "{} should pass", value);
            assert_eq!(result.message(), "ok");
        }

        for value in [-20, 19, 501, 600] {
            let result = distance(value);
            assert!(!result.succeeded(), "{} should fail", value);
            assert_eq!(result.message(), DISTANCE_MESSAGE);
        }
    }

    #[test]
    fn test_every_linear_move_uses_distance_rule() {
        let moves = [
            DroneCommand::Up(19),
            DroneCommand::Down(19),
            DroneCommand::Left(19),
            DroneCommand::Right(19),
            DroneCommand::Forward(19),
            DroneCommand::Back(19),
        ];

        for command in &moves {
            assert_eq!(check(command).message(), DISTANCE_MESSAGE);
        }
    }

    #[test]
    fn test_degrees_and_speed() {
        assert!(degrees(1).succeeded());
        assert!(degrees(360).succeeded());
        assert_eq!(degrees(0).message(), "Degrees must be between 1 and 360");
        assert_eq!(degrees(361).message(), "Degrees must be between 1 and 360");

        assert!(speed(10).succeeded());
        assert!(speed(100).succeeded());
        assert_eq!(speed(9).message(), "Speed must be between 10 and 100");
        assert_eq!(speed(101).message(), "Speed must be between 10 and 100");
    }

    #[test]
    fn test_go_degenerate_vector() {
        let result = go(20, 20, 20, 50);
        assert!(!result.succeeded());
        assert_eq!(result.message(), DEGENERATE_VECTOR);

        let result = go(21, 20, 20, 50);
        assert!(result.succeeded());
        assert_eq!(result.message(), "ok");
    }

    #[test]
    fn test_go_axis_limits() {
        assert_eq!(go(600, 100, 100, 50).message(), "X Dimension must be between 20 and 500");
        assert_eq!(go(100, -30, 100, 50).message(), "Y Dimension must be between 20 and 500");
        assert_eq!(go(100, 100, 501, 50).message(), "Z Dimension must be between 20 and 500");
        assert_eq!(go(100, 100, 100, 101).message(), "Speed must be between 10 and 100");
    }

    #[test]
    fn test_curve_accumulates_violations() {
        let result = curve(600, 100, 100, 100, 100, 100, 70);
        assert!(!result.succeeded());
        assert_eq!(
            result.message(),
            "X Dimension must be between 20 and 500\nSpeed must be between 10 and 60"
        );
    }

    #[test]
    fn test_curve_second_point() {
        assert_eq!(
            curve(100, 100, 100, 100, 100, -30, 50).message(),
            "Z Dimension must be between 20 and 500"
        );
        assert_eq!(curve(100, 100, 100, 20, 20, 20, 50).message(), DEGENERATE_VECTOR);
        assert_eq!(curve(20, 20, 20, 100, 100, 100, 50).message(), DEGENERATE_VECTOR);
        assert!(curve(100, 100, 100, 100, 100, 100, 60).succeeded());
    }

    #[test]
    fn test_unguarded_commands_pass() {
        assert!(check(&DroneCommand::TakeOff).succeeded());
        assert!(check(&DroneCommand::GetBattery).succeeded());
        // Rule applied to a foreign shape passes
        assert!(ValidationRule::Distance.apply(&DroneCommand::Land).succeeded());
    }
}
