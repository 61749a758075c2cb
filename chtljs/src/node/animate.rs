use super::{object_literal, omission, EnhancedSelector};
use crate::text::{indent, quote};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct Keyframe {
    /// Position in the timeline, expected in `[0, 1]`.
    pub at: f64,
    pub properties: IndexMap<String, String>,
}

/// `animate(...)` descriptor.
#[derive(Debug, Clone)]
pub struct Animate {
    /// Target selector text (without `{{ }}`).
    pub target: String,
    /// Milliseconds.
    pub duration: u64,
    pub easing: String,
    /// Number of plays; `-1` repeats forever.
    pub loop_count: i64,
    /// Milliseconds before the first frame.
    pub delay: u64,
    pub direction: String,
    pub begin: IndexMap<String, String>,
    /// Played in insertion order; `at` values are not re-sorted.
    pub keyframes: Vec<Keyframe>,
    pub end: IndexMap<String, String>,
    pub callback: Option<String>,
}

impl Default for Animate {
    fn default() -> Self {
        Self {
            target: String::new(),
            duration: 1000,
            easing: "ease-in-out".to_string(),
            loop_count: 1,
            delay: 0,
            direction: "normal".to_string(),
            begin: IndexMap::new(),
            keyframes: Vec::new(),
            end: IndexMap::new(),
            callback: None,
        }
    }
}

impl Animate {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    fn descriptor(&self) -> String {
        let keyframes = if self.keyframes.is_empty() {
            "[]".to_string()
        } else {
            let frames = self
                .keyframes
                .iter()
                .map(|kf| {
                    format!(
                        "{{ at: {}, properties: {} }}",
                        kf.at,
                        object_literal(&kf.properties)
                    )
                })
                .collect::<Vec<_>>()
                .join(",\n");
            format!("[\n{}\n]", indent(&frames, 1))
        };
        let fields = [
            format!("duration: {}", self.duration),
            format!("easing: {}", quote(&self.easing)),
            format!("loop: {}", self.loop_count),
            format!("delay: {}", self.delay),
            format!("direction: {}", quote(&self.direction)),
            format!("begin: {}", object_literal(&self.begin)),
            format!("keyframes: {}", keyframes),
            format!("end: {}", object_literal(&self.end)),
            format!(
                "callback: {}",
                self.callback.as_deref().unwrap_or("null")
            ),
        ];
        format!("{{\n{}\n}}", indent(&fields.join(",\n"), 1))
    }

    /// Descriptor object plus a `requestAnimationFrame` driver.
    pub fn to_javascript(&self) -> String {
        if self.target.trim().is_empty() {
            return omission("animate", "missing target selector");
        }
        let target = EnhancedSelector::new(self.target.as_str()).to_javascript();

        let mut out = String::new();
        out.push_str("(function() {\n");
        out.push_str(&format!("    var target = {};\n", target));
        out.push_str(&format!(
            "    var animation = {};\n",
            indent(&self.descriptor(), 1).trim_start()
        ));
        out.push_str("    var easings = {\n");
        out.push_str("        'ease-in': function(t) { return t * t; },\n");
        out.push_str("        'ease-out': function(t) { return 1 - (1 - t) * (1 - t); },\n");
        out.push_str("        'ease-in-out': function(t) { return t < 0.5 ? 2 * t * t : 1 - Math.pow(-2 * t + 2, 2) / 2; }\n");
        out.push_str("    };\n");
        out.push_str("    var ease = easings[animation.easing] || function(t) { return t; };\n");
        out.push_str("    var currentLoop = 0;\n");
        out.push_str("    var startTime = null;\n");
        out.push_str("    function frame(now) {\n");
        out.push_str("        if (startTime === null) {\n");
        out.push_str("            startTime = now;\n");
        out.push_str("        }\n");
        out.push_str("        var elapsed = now - startTime;\n");
        out.push_str("        var progress = animation.duration > 0 ? Math.min(elapsed / animation.duration, 1) : 1;\n");
        out.push_str("        var eased = ease(progress);\n");
        out.push_str("        // Simplified driver: begin/keyframes/end are not interpolated onto the target.\n");
        out.push_str("        if (progress < 1) {\n");
        out.push_str("            requestAnimationFrame(frame);\n");
        out.push_str("            return;\n");
        out.push_str("        }\n");
        out.push_str("        currentLoop++;\n");
        out.push_str("        if (animation.loop === -1 || currentLoop < animation.loop) {\n");
        out.push_str("            startTime = null;\n");
        out.push_str("            requestAnimationFrame(frame);\n");
        out.push_str("        } else if (typeof animation.callback === 'function') {\n");
        out.push_str("            animation.callback.call(target, eased);\n");
        out.push_str("        }\n");
        out.push_str("    }\n");
        out.push_str("    setTimeout(function() {\n");
        out.push_str("        requestAnimationFrame(frame);\n");
        out.push_str("    }, animation.delay);\n");
        out.push_str("})();");
        out
    }
}
