//! Launch requests handed over by the host

use crate::environment::Environment;
use crate::keys;

/// Strings a service or worker start receives from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    pub private_dir: String,
    /// App directory; the entrypoint is resolved relative to it.
    pub app_dir: String,
    pub entrypoint: String,
    pub log_name: String,
    pub python_home: String,
    pub python_path: String,
    /// Free-form argument forwarded to `main()`.
    pub argument: Option<String>,
}

impl LaunchRequest {
    /// Write the caller identity into `env`.
    ///
    /// `argument_key` names the call-site variable that receives the caller
    /// argument; it is written first, followed by the fixed identity keys.
    pub fn write_to<E: Environment + ?Sized>(
        &self,
        env: &mut E,
        argument_key: Option<&str>,
        bootstrap_name: &str,
    ) {
        if let (Some(key), Some(argument)) = (argument_key, self.argument.as_deref()) {
            env.set(key, argument);
        }

        env.set(keys::ANDROID_PRIVATE, &self.private_dir);
        env.set(keys::ANDROID_ARGUMENT, &self.app_dir);
        env.set(keys::ANDROID_APP_PATH, &self.app_dir);
        env.set(keys::ANDROID_ENTRYPOINT, &self.entrypoint);
        env.set(keys::PYTHONOPTIMIZE, keys::OPTIMIZE_LEVEL);
        env.set(keys::PYTHON_NAME, &self.log_name);
        env.set(keys::PYTHONHOME, &self.python_home);
        env.set(keys::PYTHONPATH, &self.python_path);
        env.set(keys::P4A_BOOTSTRAP, bootstrap_name);
    }
}
