//! Prompt rendering for the LLM collaborator.
//!
//! One function per prompt kind; handlers render here and pass the finished
//! text to [`crate::LlmClient::generate`].

use std::fmt::Write;

use venturescope_protocol::StartupForm;

fn field<'a>(value: &'a Option<String>) -> &'a str {
    value.as_deref().unwrap_or("N/A")
}

/// Conversational advisor prompt, optionally carrying the session's current
/// analysis context rendered as JSON.
pub fn advisor_prompt(context: Option<&str>, message: &str) -> String {
    let mut prompt = String::from(
        "You are an expert startup analyst and advisor specializing in research \
         commercialization. You help evaluate breakthrough potential, identify market \
         opportunities, and provide strategic guidance for science-to-market transitions. \
         Be conversational, insightful, and focus on practical advice for researchers \
         and entrepreneurs.\n",
    );

    if let Some(context) = context {
        let _ = write!(
            prompt,
            "\nCURRENT ANALYSIS CONTEXT:\n{context}\n\nUse this context to provide more \
             relevant and personalized advice.\n"
        );
    }

    let _ = write!(prompt, "\nUser message: {message}");
    prompt
}

/// Structured evaluation prompt for a startup-description form. Asks for a
/// JSON object with named sub-scores, detailed rationale, and recommendations.
pub fn analysis_prompt(form: &StartupForm) -> String {
    let mut features = String::new();
    if !form.additional_features.is_empty() {
        features.push_str("\n\nAdditional Custom Features to Evaluate:\n");
        for feature in &form.additional_features {
            let _ = writeln!(features, "- {}: {}", feature.name, feature.description);
        }
    }

    format!(
        "You are an expert startup analyst specializing in evaluating breakthrough \
         potential from scientific research. Analyze this startup:\n\
         \n\
         STARTUP INFORMATION:\n\
         - Name: {name}\n\
         - Description: {description}\n\
         - Problem: {problem}\n\
         - Solution: {solution}\n\
         - Target Market: {target_market}\n\
         - Business Model: {business_model}\n\
         - Competitive Advantage: {competitive_advantage}\n\
         - Team: {team}\n\
         - Funding: {funding}{features}\n\
         \n\
         EVALUATION CRITERIA (Rate 1-10 for each):\n\
         1. Research Gap Analysis - How well does this address an unmet research need?\n\
         2. Future Potential/Scope - Long-term scalability and impact potential\n\
         3. Competitors Intensity - Level of competition in the market\n\
         4. Team Strength - Technical knowledge, marketing skills, execution capability\n\
         5. Tech Novelty - Innovation level and technological advancement\n\
         6. Market Demand - Current and projected market need\n\
         7. Market Potential - Size and growth potential of target market\n\
         8. Revenue Generation - Viability and scalability of revenue model\n\
         \n\
         REQUIRED OUTPUT FORMAT:\n\
         Provide a JSON response with this exact structure:\n\
         {{\n\
           \"scores\": {{\n\
             \"researchGap\": [1-10],\n\
             \"futurePotential\": [1-10],\n\
             \"competitorsIntensity\": [1-10],\n\
             \"teamStrength\": [1-10],\n\
             \"techNovelty\": [1-10],\n\
             \"marketDemand\": [1-10],\n\
             \"marketPotential\": [1-10],\n\
             \"revenueGeneration\": [1-10]\n\
           }},\n\
           \"compositeScore\": [1-10],\n\
           \"detailedAnalysis\": {{ \"researchGap\": \"...\", \"futurePotential\": \"...\", \
         \"competitorsIntensity\": \"...\", \"teamStrength\": \"...\", \"techNovelty\": \"...\", \
         \"marketDemand\": \"...\", \"marketPotential\": \"...\", \"revenueGeneration\": \"...\" }},\n\
           \"recommendations\": [\"...\", \"...\", \"...\"],\n\
           \"breakthroughPotential\": \"Overall assessment\",\n\
           \"nextSteps\": [\"...\", \"...\", \"...\"]\n\
         }}\n\
         \n\
         Focus on scientific breakthrough potential and commercialization viability.",
        name = field(&form.name),
        description = field(&form.description),
        problem = field(&form.problem),
        solution = field(&form.solution),
        target_market = field(&form.target_market),
        business_model = field(&form.business_model),
        competitive_advantage = field(&form.competitive_advantage),
        team = field(&form.team),
        funding = field(&form.funding),
        features = features,
    )
}

/// Extended multi-section prompt for a deep narrative analysis of free text
pub fn deep_analysis_prompt(text: &str) -> String {
    format!(
        "You are an expert startup analyst and business consultant specializing in \
         research commercialization. Conduct a comprehensive, in-depth analysis of the \
         following startup information:\n\
         \n\
         {text}\n\
         \n\
         Please provide a detailed analysis covering:\n\
         \n\
         1. EXECUTIVE SUMMARY - key findings, breakthrough potential score (1-10), \
         critical success factors\n\
         2. TECHNICAL ANALYSIS - technology maturity, innovation level, technical risks, \
         development timeline\n\
         3. MARKET ANALYSIS - market size and growth, customer segments, competitive \
         landscape, entry barriers, go-to-market strategy\n\
         4. BUSINESS MODEL EVALUATION - revenue viability, scalability, unit economics, \
         funding requirements, path to profitability\n\
         5. TEAM & EXECUTION - team composition, skills gaps, leadership, execution \
         capability\n\
         6. RISK ASSESSMENT - technical, market, financial, and regulatory risks with \
         mitigation strategies\n\
         7. OPPORTUNITY ANALYSIS - market timing, competitive advantages, partnerships, \
         exit potential\n\
         8. RECOMMENDATIONS - immediate next steps, strategic priorities, resource \
         requirements, success metrics\n\
         9. INVESTMENT THESIS - why this could be a breakthrough, key value drivers, \
         potential returns\n\
         \n\
         Format your response in a clear, structured manner with specific insights and \
         actionable recommendations. Focus on scientific breakthrough potential and \
         commercialization viability."
    )
}
