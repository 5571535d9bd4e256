// File: crates/bubble-core/src/scene.rs
// Summary: Displayed bubble set keyed by surname; enter/update/exit reconciliation and timed transitions.

use std::collections::HashMap;
use std::time::Duration;

use skia_safe as skia;

use crate::palette::lerp_color;

/// Visual attributes of one bubble at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleState {
    pub radius: f32,
    pub x: f32,
    pub y: f32,
    pub color: skia::Color,
}

impl BubbleState {
    pub fn lerp(&self, to: &BubbleState, t: f32) -> BubbleState {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        BubbleState {
            radius: mix(self.radius, to.radius),
            x: mix(self.x, to.x),
            y: mix(self.y, to.y),
            color: lerp_color(self.color, to.color, t),
        }
    }
}

/// Where a surname should end up after this frame's transition.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleTarget {
    pub surname: String,
    pub nationality: String,
    pub count: u64,
    pub state: BubbleState,
}

/// A bubble on screen, animating from `from` to `to`.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayedBubble {
    pub surname: String,
    pub nationality: String,
    pub count: u64,
    pub from: BubbleState,
    pub to: BubbleState,
}

impl DisplayedBubble {
    /// State at eased progress `t` in [0, 1].
    pub fn at(&self, t: f32) -> BubbleState {
        if t >= 1.0 {
            self.to
        } else if t <= 0.0 {
            self.from
        } else {
            self.from.lerp(&self.to, t)
        }
    }
}

/// Keys touched by one reconciliation, in the order they were processed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

/// Cubic ease-in-out over [0, 1].
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let u = t - 2.0;
        (u * u * u + 2.0) / 2.0
    }
}

/// The currently displayed set. Draw order is stable: survivors keep their
/// slot, entering bubbles are appended in dataset order.
#[derive(Clone, Debug)]
pub struct Scene {
    bubbles: Vec<DisplayedBubble>,
    center: (f32, f32),
    transition: Duration,
    label: String,
}

impl Scene {
    pub fn new(center: (f32, f32), transition: Duration) -> Self {
        Self { bubbles: Vec::new(), center, transition, label: String::new() }
    }

    pub fn bubbles(&self) -> &[DisplayedBubble] { &self.bubbles }
    pub fn len(&self) -> usize { self.bubbles.len() }
    pub fn is_empty(&self) -> bool { self.bubbles.is_empty() }
    pub fn label(&self) -> &str { &self.label }
    pub fn set_label(&mut self, label: impl Into<String>) { self.label = label.into(); }
    pub fn transition(&self) -> Duration { self.transition }

    pub fn get(&self, surname: &str) -> Option<&DisplayedBubble> {
        self.bubbles.iter().find(|b| b.surname == surname)
    }

    /// Eased progress of the running transition `elapsed` after it started.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.transition.is_zero() {
            return 1.0;
        }
        ease_cubic_in_out(elapsed.as_secs_f32() / self.transition.as_secs_f32())
    }

    /// Replace the displayed set with `targets`. `elapsed` is the time since the
    /// previous reconcile; bubbles still mid-transition restart from where they are.
    /// Targets must have unique surnames.
    pub fn reconcile(&mut self, targets: Vec<BubbleTarget>, elapsed: Duration) -> ReconcileReport {
        let t = self.progress(elapsed);
        let mut report = ReconcileReport::default();

        let mut by_key: HashMap<String, BubbleTarget> = HashMap::with_capacity(targets.len());
        let mut order: Vec<String> = Vec::with_capacity(targets.len());
        for target in targets {
            order.push(target.surname.clone());
            by_key.insert(target.surname.clone(), target);
        }

        let mut next: Vec<DisplayedBubble> = Vec::with_capacity(order.len());
        for old in self.bubbles.drain(..) {
            match by_key.remove(&old.surname) {
                Some(target) => {
                    report.updated.push(old.surname.clone());
                    next.push(DisplayedBubble {
                        from: old.at(t),
                        to: target.state,
                        surname: target.surname,
                        nationality: target.nationality,
                        count: target.count,
                    });
                }
                None => report.exited.push(old.surname),
            }
        }

        for key in order {
            let Some(target) = by_key.remove(&key) else { continue };
            report.entered.push(key);
            let from = BubbleState { radius: 0.0, x: self.center.0, y: self.center.1, color: target.state.color };
            next.push(DisplayedBubble {
                from,
                to: target.state,
                surname: target.surname,
                nationality: target.nationality,
                count: target.count,
            });
        }

        self.bubbles = next;
        report
    }

    /// Every bubble's state `elapsed` into the current transition, in draw order.
    pub fn sample(&self, elapsed: Duration) -> Vec<BubbleState> {
        let t = self.progress(elapsed);
        self.bubbles.iter().map(|b| b.at(t)).collect()
    }

    /// Final states once the transition has finished.
    pub fn settled(&self) -> Vec<BubbleState> {
        self.bubbles.iter().map(|b| b.to).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, r: f32, x: f32, y: f32) -> BubbleTarget {
        BubbleTarget {
            surname: name.to_string(),
            nationality: "English".to_string(),
            count: r as u64,
            state: BubbleState { radius: r, x, y, color: skia::Color::from_rgb(10, 20, 30) },
        }
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(ease_cubic_in_out(3.0), 1.0);
    }

    #[test]
    fn new_bubbles_grow_from_center() {
        let mut scene = Scene::new((50.0, 40.0), Duration::from_millis(800));
        let report = scene.reconcile(vec![target("Smith", 10.0, 70.0, 40.0)], Duration::ZERO);
        assert_eq!(report.entered, ["Smith"]);
        let start = scene.sample(Duration::ZERO)[0];
        assert_eq!((start.radius, start.x, start.y), (0.0, 50.0, 40.0));
        let end = scene.sample(Duration::from_millis(800))[0];
        assert_eq!((end.radius, end.x, end.y), (10.0, 70.0, 40.0));
    }

    #[test]
    fn enter_update_exit_by_key() {
        let mut scene = Scene::new((0.0, 0.0), Duration::from_millis(800));
        scene.reconcile(vec![target("A", 5.0, 1.0, 1.0), target("B", 6.0, 2.0, 2.0)], Duration::ZERO);
        let report = scene.reconcile(
            vec![target("C", 7.0, 3.0, 3.0), target("B", 8.0, 4.0, 4.0)],
            Duration::from_secs(1),
        );
        assert_eq!(report.exited, ["A"]);
        assert_eq!(report.updated, ["B"]);
        assert_eq!(report.entered, ["C"]);

        // survivor keeps its slot ahead of the newcomer
        let names: Vec<&str> = scene.bubbles().iter().map(|b| b.surname.as_str()).collect();
        assert_eq!(names, ["B", "C"]);

        let b = scene.get("B").unwrap();
        assert_eq!((b.from.radius, b.from.x), (6.0, 2.0));
        assert_eq!((b.to.radius, b.to.x), (8.0, 4.0));
    }

    #[test]
    fn interrupted_transition_restarts_from_current_state() {
        let mut scene = Scene::new((0.0, 0.0), Duration::from_millis(800));
        scene.reconcile(vec![target("A", 10.0, 100.0, 0.0)], Duration::ZERO);
        scene.reconcile(vec![target("A", 10.0, 0.0, 0.0)], Duration::from_millis(400));
        let a = scene.get("A").unwrap();
        // halfway through the first transition (ease(0.5) == 0.5)
        assert!((a.from.x - 50.0).abs() < 1e-3);
        assert!((a.from.radius - 5.0).abs() < 1e-3);
    }

    #[test]
    fn unchanged_targets_are_a_no_op_once_settled() {
        let targets = vec![target("A", 5.0, 1.0, 2.0), target("B", 9.0, 3.0, 4.0)];
        let mut scene = Scene::new((0.0, 0.0), Duration::from_millis(800));
        scene.reconcile(targets.clone(), Duration::ZERO);
        let first = scene.settled();
        let report = scene.reconcile(targets, Duration::from_secs(1));
        assert!(report.entered.is_empty() && report.exited.is_empty());
        assert_eq!(scene.settled(), first);
        assert_eq!(scene.sample(Duration::ZERO), first);
    }

    #[test]
    fn empty_targets_clear_the_scene() {
        let mut scene = Scene::new((0.0, 0.0), Duration::from_millis(800));
        scene.reconcile(vec![target("A", 5.0, 1.0, 2.0)], Duration::ZERO);
        let report = scene.reconcile(Vec::new(), Duration::from_secs(1));
        assert_eq!(report.exited, ["A"]);
        assert!(scene.is_empty());
        assert!(scene.sample(Duration::ZERO).is_empty());
    }
}
