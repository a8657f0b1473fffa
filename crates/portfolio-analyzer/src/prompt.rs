use crate::metrics::PortfolioMetrics;
use crate::models::PortfolioItem;

const CHAT_PREAMBLE: &str = "You are a financial AI assistant. Format your response in Markdown. \
More on stocks and investments can be found at https://www.moneycontrol.com/india/stockpricequote/";

/// Prompt for a free-form chat question.
pub fn chat_prompt(user_message: &str) -> String {
    format!("{}User query: {}", CHAT_PREAMBLE, user_message)
}

/// One line per holding: `SYMBOL: qty shares @ ₹avg (Current: ₹cur)`.
pub fn holdings_text(items: &[PortfolioItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{}: {} shares @ ₹{:.2} (Current: ₹{:.2})",
                item.symbol_or_unknown(),
                item.quantity_display(),
                item.avg_buy_price,
                item.current_price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking for a narrative portfolio review.
pub fn analysis_prompt(metrics: &PortfolioMetrics, items: &[PortfolioItem]) -> String {
    format!(
        "Analyze this investment portfolio and provide insights:

Portfolio Summary:
- Total Portfolio Value: ₹{:.2}
- Total Investment: ₹{:.2}
- Total P/L: ₹{:.2} ({:.2}%)

Holdings:
{}

Please provide a comprehensive analysis including:
1. Overall portfolio health assessment
2. Key risks and opportunities
3. Diversification analysis
4. Specific recommendations for improvement
5. Performance evaluation

Keep the analysis concise, actionable, and format your response in Markdown.",
        metrics.total_value,
        metrics.total_investment,
        metrics.total_profit_loss,
        metrics.profit_loss_percentage,
        holdings_text(items)
    )
}
