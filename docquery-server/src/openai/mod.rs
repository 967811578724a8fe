pub mod openai_client;
pub mod openai_which;

// Based on openai-api-rs <https://github.com/dongri/openai-api-rs>
pub mod chat_completion;
pub mod embedding;

#[cfg(test)]
pub mod test_models;
