pub mod instruction_reader;
pub mod state_writer;
