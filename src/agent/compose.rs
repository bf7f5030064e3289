//! Final response composition: one model call over the assembled context,
//! or a deterministic keyword-matched template when the model is down.

use crate::gemini::GenerativeClient;

use super::planner::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeSource {
    Model,
    Template,
}

#[derive(Debug, Clone)]
pub struct Composed {
    pub text: String,
    pub source: ComposeSource,
}

pub async fn compose(
    ai: &dyn GenerativeClient,
    user_input: &str,
    memory_context: &str,
    plan: &Plan,
) -> Composed {
    let tasks: Vec<String> = plan
        .tasks
        .iter()
        .map(|t| format!("- {} ({}): {}", t.task, t.category.id(), t.reason))
        .collect();
    let observation = plan.observation.as_deref().unwrap_or("none");

    let prompt = format!(
        "You are a caring, evidence-minded menstrual health companion.\n\n\
         CONTEXT:\n{memory_context}\n\n\
         OBSERVATION: {observation}\n\n\
         PLANNED TASKS:\n{}\n\n\
         USER MESSAGE: \"{user_input}\"\n\n\
         Write a warm, concise reply to the user that weaves in the \
         observation where it helps. Do not mention the planning process.",
        tasks.join("\n")
    );

    match ai.generate(&prompt).await {
        Ok(text) => Composed {
            text,
            source: ComposeSource::Model,
        },
        Err(e) => {
            tracing::warn!("⚠️ Compose call failed, using template: {}", e);
            Composed {
                text: template_response(user_input),
                source: ComposeSource::Template,
            }
        }
    }
}

/// Deterministic fallback: keyword-matched advice blocks plus a fixed
/// next-steps footer. Pure string assembly, always succeeds.
pub fn template_response(user_input: &str) -> String {
    let lowered = user_input.to_lowercase();
    let mut sections: Vec<&str> = Vec::new();

    if lowered.contains("cramp") {
        sections.push(
            "For cramps: a heating pad on your lower abdomen, gentle stretching, \
             and staying hydrated can all ease the discomfort. If pain is severe \
             or unusual for you, it is worth checking in with a clinician.",
        );
    }
    if lowered.contains("tired") || lowered.contains("fatigue") || lowered.contains("exhaust") {
        sections.push(
            "For fatigue: energy often dips in the days before and during your \
             period. Prioritize sleep, eat iron-rich foods, and keep movement \
             light rather than skipping it entirely.",
        );
    }
    if lowered.contains("mood") || lowered.contains("bloat") || lowered.contains("irritab") {
        sections.push(
            "For mood changes and bloating: hormonal shifts are the usual driver. \
             Regular light exercise, less sodium, and a consistent sleep schedule \
             tend to soften both.",
        );
    }
    if lowered.contains("eat") || lowered.contains("food") || lowered.contains("nutrition") {
        sections.push(
            "On nutrition: lean into iron, magnesium and omega-3 sources around \
             your period - leafy greens, legumes, nuts and fish - and keep \
             caffeine moderate.",
        );
    }
    if lowered.contains("track") || lowered.contains("cycle") || lowered.contains("log") {
        sections.push(
            "On tracking: logging your period start dates and daily symptoms \
             builds the picture that makes patterns visible. Even a few words \
             per day is enough.",
        );
    }

    if sections.is_empty() {
        sections.push(
            "I'm here to help with anything cycle related - symptoms, remedies, \
             tracking, or just talking through how you're feeling.",
        );
    }

    let mut reply = sections.join("\n\n");
    reply.push_str(
        "\n\nNext steps: log how you're feeling today, keep water nearby, and \
         reach out to a healthcare provider if anything feels off or gets worse.",
    );
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_matches_symptom_keywords() {
        let reply = template_response("I have cramps and feel so tired");
        assert!(reply.contains("For cramps"));
        assert!(reply.contains("For fatigue"));
        assert!(reply.contains("Next steps:"));
    }

    #[test]
    fn template_covers_nutrition_and_tracking() {
        assert!(template_response("what should I eat?").contains("On nutrition"));
        assert!(template_response("how do I track my cycle?").contains("On tracking"));
    }

    #[test]
    fn template_never_returns_empty() {
        let reply = template_response("hello there");
        assert!(!reply.trim().is_empty());
        assert!(reply.contains("Next steps:"));
    }
}
