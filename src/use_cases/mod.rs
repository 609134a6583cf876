pub mod issue_relay_token;
pub mod revoke_tokens;

#[cfg(test)]
pub(crate) mod test_support;
