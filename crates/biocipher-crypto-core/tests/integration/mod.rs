mod envelope_roundtrip;
