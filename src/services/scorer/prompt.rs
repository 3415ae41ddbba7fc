/// System message pinning the reply format
pub const SYSTEM_PROMPT: &str =
    "You are a spam detection assistant for a chat community. You only reply with JSON.";

/// Build the scoring rubric for one message
pub fn build_prompt(message_text: &str) -> String {
    format!(
        r#"You review messages posted in a chat community and rate how likely each one is spam.

Normal discussion includes, among other things:
- questions, answers and opinions about the community's topic
- sharing experience, analysis or links relevant to the topic
- enthusiastic or emotional messages that stay on topic

Spam is:
1. Solicitation that pulls members into private channels ("add me on WhatsApp", "DM me for signals")
2. Promotion unrelated to the topic, or guaranteed-profit offers ("100% win rate", "risk free returns")
3. Advertising for products, services, gambling or adult content
4. Harassment, insults or flooding

Rate the message below from 0 to 10:
- 0-3: completely normal discussion
- 4-6: a little suspicious but probably normal
- 7: suspicious
- 8-10: clearly spam

Message:
"""{message_text}"""

Reply with JSON only:
{{
    "score": <number from 0 to 10>,
    "reasoning": "<short justification, under 50 words>"
}}"#
    )
}
