mod expressions;
mod functions;
mod modules;
mod recovery;
mod scopes;
