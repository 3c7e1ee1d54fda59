mod demos_run;
mod error_handling;
