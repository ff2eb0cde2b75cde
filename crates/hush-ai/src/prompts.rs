/// Fixed moderation prompt. The model must answer with a bare "Yes" or "No".
pub fn moderation(content: &str) -> String {
    format!(
        "You are a content moderation assistant. Analyze the following message and respond \
         with \"Yes\" if the message contains toxic or abusive content, otherwise respond \
         with \"No\".\nMessage: \"{}\"",
        content
    )
}

pub const SUGGESTIONS: &str = "Generate 3 open-ended questions as a single string separated by '||'. \
     Topics should be universal, engaging, and suitable for anonymous social messaging. \
     Example: 'What hobby have you recently started?||Which historical figure would you dine with?||What simple thing makes you happy?'";
