mod aes_gcm;
mod sha256;
