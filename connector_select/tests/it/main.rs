
mod test_select;
#[cfg(feature = "src_oracle")]
mod test_oracle;
#[cfg(feature = "src_sqlite")]
mod test_sqlite;
