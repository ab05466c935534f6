mod model_loaders;

pub use model_loaders::load_task_middleware;
