//! Foundation-backed implementation of the bundle oracle.
//!
//! Reads from `NSBundle.mainBundle`. Info-dictionary values are stringified
//! through their `description`, mirroring how the platform renders arbitrary
//! objects as text.

use objc2::msg_send_id;
use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_foundation::{NSBundle, NSString};

use super::Bundle;

/// The running application's main bundle.
pub(super) struct MainBundle;

impl Bundle for MainBundle {
    fn info_value(&self, key: &str) -> Option<String> {
        let bundle = NSBundle::mainBundle();
        let key = NSString::from_str(key);
        let value: Retained<AnyObject> = unsafe { bundle.objectForInfoDictionaryKey(&key) }?;
        let description: Retained<NSString> = unsafe { msg_send_id![&*value, description] };
        Some(description.to_string())
    }

    fn bundle_identifier(&self) -> Option<String> {
        NSBundle::mainBundle()
            .bundleIdentifier()
            .map(|identifier| identifier.to_string())
    }

    fn app_store_receipt_path(&self) -> Option<String> {
        let url = unsafe { NSBundle::mainBundle().appStoreReceiptURL() }?;
        unsafe { url.path() }.map(|path| path.to_string())
    }
}
