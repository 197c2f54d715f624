//! JNI bindings for the Android app.
//!
//! Each public function here corresponds to an `external fun` declaration
//! in NavBridge.kt. The function names follow JNI naming conventions:
//! Java_<package>_<class>_<method> with dots replaced by underscores.
//! Failures come back as `{"error": "..."}` JSON instead of exceptions.

use jni::objects::{JByteArray, JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::bridge;

fn to_jstring(env: &JNIEnv, value: &str) -> jstring {
    env.new_string(value)
        .expect("failed to create Java string")
        .into_raw()
}

fn respond(env: &JNIEnv, result: crate::Result<String>) -> jstring {
    match result {
        Ok(json) => to_jstring(env, &json),
        Err(err) => {
            log::warn!("bridge call failed: {err}");
            to_jstring(env, &bridge::error_json(&err))
        }
    }
}

/// Returns the library version.
/// Maps to: NavBridge.version() -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ridenav_app_NavBridge_version(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    to_jstring(&env, crate::VERSION)
}

/// Routes `log` output to logcat. Safe to call more than once.
/// Maps to: NavBridge.initLogging()
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ridenav_app_NavBridge_initLogging(
    _env: JNIEnv,
    _class: JClass,
) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("ridenav"),
    );
}

/// Maps to: NavBridge.analyzeRoute(requestJson: String) -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ridenav_app_NavBridge_analyzeRoute(
    mut env: JNIEnv,
    _class: JClass,
    request: JString,
) -> jstring {
    let result = env
        .get_string(&request)
        .map(String::from)
        .map_err(|e| crate::Error::InvalidRequest(e.to_string()))
        .and_then(|request| bridge::analyze_route_json(&request));
    respond(&env, result)
}

/// Maps to: NavBridge.gpxToRoute(data: ByteArray) -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_ridenav_app_NavBridge_gpxToRoute(
    env: JNIEnv,
    _class: JClass,
    data: JByteArray,
) -> jstring {
    let result = env
        .convert_byte_array(&data)
        .map_err(|e| crate::Error::InvalidRequest(e.to_string()))
        .and_then(|bytes| bridge::gpx_to_route_json(&bytes));
    respond(&env, result)
}
