mod programs;
mod recovery;
