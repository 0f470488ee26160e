#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("current user message is {actual} tokens, over the {limit} limit")]
    UserInputTooLarge { actual: u32, limit: u32 },

    #[error(
        "budget exhausted: context={context_length} tools={tools_tokens} response_reserve={response_reserve} overhead={fixed_overhead} leaves {available} available, below the floor of {floor}"
    )]
    BudgetExceeded { context_length: u32, tools_tokens: u32, response_reserve: u32, fixed_overhead: u32, available: i64, floor: u32 },
}
