use crate::models::{GenerationRequest, ScriptType};

/// Category instructions that open the prompt.
pub fn category_instructions(kind: &ScriptType) -> &'static str {
    match kind {
        ScriptType::Youtube => "Create a compelling YouTube video script that hooks viewers in the first 5 seconds and maintains engagement throughout. Structure: Hook → Problem/Topic Introduction → Value Delivery → Call to Action.",
        ScriptType::Advertisement => "Write a high-converting advertisement script using the AIDA framework (Attention, Interest, Desire, Action). Focus on emotional triggers and clear value propositions.",
        ScriptType::Presentation => "Develop a professional presentation script with clear transitions, compelling storytelling, and actionable insights. Include speaker notes and timing suggestions.",
        ScriptType::Social => "Create engaging social media content that encourages interaction and shares. Include hashtag suggestions and optimal posting strategies.",
        ScriptType::Explainer => "Write a clear, educational explainer video script that simplifies complex topics. Use analogies, examples, and step-by-step explanations.",
        ScriptType::Sales => "Craft a persuasive sales pitch script addressing pain points, presenting solutions, and overcoming objections. Include strategic pauses and emphasis points.",
        ScriptType::Educational => "Develop an educational script that facilitates learning through clear explanations, examples, and interactive elements. Include assessment questions.",
        ScriptType::Podcast => "Create a podcast script with natural conversation flow, interesting segments, and engaging guest interactions. Include transition phrases and timing cues.",
        ScriptType::Other(_) => "Create a professional script for the specified content type.",
    }
}

/// Assembles the completion prompt. Pure and total: unknown script types fall back
/// to the generic instructions.
pub fn build_prompt(req: &GenerationRequest) -> String {
    let instructions = category_instructions(&req.kind());
    format!(
        "{instructions}

Topic: {topic}
Tone: {tone}
Target Length: {length}
Target Audience: {audience}
Additional Requirements: {notes}

Please provide:
1. A compelling hook/opening
2. Well-structured main content
3. Clear call-to-action
4. Suggested delivery notes
5. Estimated timing

Make the script engaging, actionable, and tailored to the specific audience and platform requirements.",
        topic = req.topic,
        tone = req.tone,
        length = req.length,
        audience = req.audience,
        notes = req.notes_text(),
    )
}
