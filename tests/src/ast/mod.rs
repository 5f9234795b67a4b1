mod arena;
mod nodes;
