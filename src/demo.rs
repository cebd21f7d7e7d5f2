use async_trait::async_trait;
use tracing::info;

use crate::error::GenerationError;
use crate::generator::ScriptGenerator;
use crate::models::GenerationRequest;

/// Offline generator that fills a fixed script outline from the form values.
/// Used when `DEMO_MODE` is on so the UI can be exercised without an API key.
#[derive(Debug, Default, Clone)]
pub struct DemoGenerator;

fn spoken_length(length: &str) -> &'static str {
    if length == "short" { "60 seconds" } else { "3 minutes" }
}

fn estimated_duration(length: &str) -> &'static str {
    match length {
        "short" => "30-60 seconds",
        "medium" => "1-3 minutes",
        _ => "3-5 minutes",
    }
}

pub fn render_demo_script(req: &GenerationRequest) -> String {
    let kind = req.kind();
    let topic_lower = req.topic.to_lowercase();
    let tone_lower = req.tone.to_lowercase();
    let notes = match req.notes_text() {
        "" => String::new(),
        text => format!("\n## Additional Notes\n{}\n", text),
    };

    format!(
        "# {label} Script: {topic}

## Opening Hook (0-5 seconds)
\"Did you know that {topic_lower} could completely transform your approach to [relevant area]? In the next {spoken}, I'll show you exactly how.\"

## Main Content
[Tailored for {audience} in a {tone_lower} tone]

### Key Point 1: The Problem
Many people struggle with {topic_lower} because they don't have the right strategy. This leads to frustration and missed opportunities.

### Key Point 2: The Solution
Here's what actually works: [specific actionable advice related to {topic}]

### Key Point 3: Implementation
To get started immediately:
1. First step based on your topic
2. Second actionable item
3. Third implementation tip

## Call to Action
Ready to take your {topic_lower} to the next level?
{notes}
## Delivery Notes
- Speak with {tone_lower} energy
- Pause for 2 seconds after the hook
- Emphasize key numbers and statistics
- End with clear next steps

**Estimated Duration:** {duration}
**Target Audience:** {audience}",
        label = kind.label(),
        topic = req.topic,
        spoken = spoken_length(&req.length),
        audience = req.audience,
        duration = estimated_duration(&req.length),
    )
}

#[async_trait]
impl ScriptGenerator for DemoGenerator {
    async fn generate(&self, _prompt: &str, request: &GenerationRequest) -> Result<String, GenerationError> {
        info!("Using demo mode - rendering offline script for '{}'", request.topic);
        Ok(render_demo_script(request))
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}
