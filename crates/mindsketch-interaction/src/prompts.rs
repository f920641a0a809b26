//! Prompt text for the reasoning service.

use mindsketch_core::analysis::AnalysisResult;

/// Fixed instruction describing the HTP interpretation task. Sent with every
/// analysis request, ahead of the three drawings.
pub const HTP_ANALYSIS_PROMPT: &str = "당신은 전문 미술 치료사입니다. 제공된 3장의 HTP(House-Tree-Person) 그림을 분석하여 심리 분석 결과를 한국어로 제공하세요.
내담자의 그림에서 나타나는 특징적인 요소(선의 세기, 위치, 문이나 창문의 유무, 나무의 모양 등)를 포착하여 무의식적인 심리 상태를 심층적으로 분석해 주세요.
따뜻하고 공감적인 말투를 사용하되, 전문적인 통찰력을 잃지 마세요.";

/// Opening model turn seeded into every counselor session.
pub const COUNSELOR_GREETING: &str =
    "안녕하세요! 분석 결과를 바탕으로 더 궁금하신 점이 있다면 편하게 말씀해 주세요.";

/// Model turn appended in place of an assistant turn that failed to arrive.
pub const COUNSELOR_FALLBACK: &str = "잠시 연결이 원활하지 않네요. 다시 시도해 주시겠어요?";

/// Builds the system framing for a counselor session from the bound result's
/// summary and advice.
pub fn counselor_framing(result: &AnalysisResult) -> String {
    format!(
        "당신은 내담자의 HTP 분석 결과(요약: {}, 조언: {})를 알고 있는 전문 심리상담사입니다. 따뜻하고 공감적인 미술 치료 전문가로서 대화하세요.",
        result.report.summary, result.report.advice
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsketch_core::analysis::AnalysisReport;

    #[test]
    fn test_framing_embeds_summary_and_advice() {
        let result = AnalysisResult::assign(AnalysisReport {
            summary: "요약-텍스트".to_string(),
            personality_traits: vec![],
            emotional_state: "e".to_string(),
            advice: "조언-텍스트".to_string(),
            key_insights: vec![],
        });
        let framing = counselor_framing(&result);
        assert!(framing.contains("요약-텍스트"));
        assert!(framing.contains("조언-텍스트"));
    }
}
