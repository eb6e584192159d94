mod classify;
mod lookup;
mod preprocess;
